//!
//! The fund me tester filters.
//!

use std::collections::HashSet;

use crate::scenario::Group;

///
/// The fund me tester filters.
///
#[derive(Debug, Default)]
pub struct Filters {
    /// The scenario name filters.
    name_filters: HashSet<String>,
    /// The group filters.
    group_filters: HashSet<Group>,
}

impl Filters {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(name_filters: Vec<String>, group_filters: Vec<Group>) -> Self {
        Self {
            name_filters: name_filters.into_iter().collect(),
            group_filters: group_filters.into_iter().collect(),
        }
    }

    ///
    /// Check if the scenario name contains any of the name filters.
    ///
    pub fn check_name(&self, name: &str) -> bool {
        self.name_filters.is_empty()
            || self
                .name_filters
                .iter()
                .any(|filter| name.contains(filter.as_str()))
    }

    ///
    /// Check if the scenario group is selected.
    ///
    pub fn check_group(&self, group: Group) -> bool {
        self.group_filters.is_empty() || self.group_filters.contains(&group)
    }
}

#[cfg(test)]
mod tests {
    use super::Filters;
    use crate::scenario::Group;

    #[test]
    fn empty_filters_select_everything() {
        let filters = Filters::default();
        assert!(filters.check_name("staging :: FundMe allows people to fund and withdraw"));
        assert!(filters.check_group(Group::Unit));
    }

    #[test]
    fn selects_by_name_and_group() {
        let filters = Filters::new(vec!["withdraw".to_owned()], vec![Group::Staging]);
        assert!(filters.check_name("staging :: FundMe allows people to fund and withdraw"));
        assert!(!filters.check_name("unit :: fund fails without enough ETH"));
        assert!(filters.check_group(Group::Staging));
        assert!(!filters.check_group(Group::Unit));
    }
}
