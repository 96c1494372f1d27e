//! Which cases and experiments a run works on.

use crate::error::{CatalogError, Result};

/// Selected cases, each optionally narrowed to some experiments.
///
/// An empty selection means every available case with all its experiments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cases: Vec<(String, Vec<String>)>,
}

fn split_names(value: &str) -> Vec<String> {
    value
        .split(':')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a selection from `case1:case2` and `exp1:exp2` arguments.
    ///
    /// Experiments can only be given together with exactly one case.
    pub fn from_args(case: Option<&str>, exp: Option<&str>) -> Result<Self> {
        let cases = case.map(split_names).unwrap_or_default();
        let experiments = exp.map(split_names).unwrap_or_default();

        if !experiments.is_empty() && cases.len() != 1 {
            return Err(CatalogError::Config {
                message: "Give exactly one case when selecting experiments".to_string(),
            });
        }

        let mut selection = Self::all();
        for name in cases {
            selection = selection.with_case(name, experiments.clone());
        }
        Ok(selection)
    }

    /// Add a case; an empty experiment list selects all of its experiments
    pub fn with_case(mut self, case: impl Into<String>, experiments: Vec<String>) -> Self {
        let case = case.into();
        match self.cases.iter_mut().find(|(name, _)| *name == case) {
            Some((_, existing)) => existing.extend(experiments),
            None => self.cases.push((case, experiments)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn case_names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|(name, _)| name.as_str())
    }

    /// Experiments selected for a case, empty when all are wanted
    pub fn experiments(&self, case: &str) -> &[String] {
        self.cases
            .iter()
            .find(|(name, _)| name == case)
            .map(|(_, experiments)| experiments.as_slice())
            .unwrap_or(&[])
    }

    /// True if any case is narrowed to explicit experiments
    pub fn experiments_given(&self) -> bool {
        self.cases.iter().any(|(_, experiments)| !experiments.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_args_cases_only() {
        let selection = Selection::from_args(Some("a:b"), None).unwrap();
        assert_eq!(selection.case_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(!selection.experiments_given());
        assert!(selection.experiments("a").is_empty());
    }

    #[test]
    fn test_from_args_with_experiments() {
        let selection = Selection::from_args(Some("a"), Some("x:y")).unwrap();
        assert!(selection.experiments_given());
        assert_eq!(selection.experiments("a"), ["x".to_string(), "y".to_string()]);
        assert!(selection.experiments("other").is_empty());
    }

    #[test]
    fn test_experiments_need_exactly_one_case() {
        assert!(matches!(
            Selection::from_args(Some("a:b"), Some("x")),
            Err(CatalogError::Config { .. })
        ));
        assert!(Selection::from_args(None, Some("x")).is_err());
    }

    #[test]
    fn test_nothing_selected() {
        let selection = Selection::from_args(None, None).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection, Selection::all());
    }
}
