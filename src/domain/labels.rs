use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::errors::{DomainError, DomainResult};

/// Class id to label name, fixed when the model is loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassLabelTable {
    names: BTreeMap<usize, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YamlNames {
    List(Vec<String>),
    Map(BTreeMap<usize, String>),
}

#[derive(Deserialize)]
struct DatasetYaml {
    names: YamlNames,
}

impl ClassLabelTable {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::<String>::into).enumerate().collect(),
        }
    }

    /// Parses a training dataset file (`names:` as a list or an id map).
    pub fn from_yaml(src: &str) -> DomainResult<Self> {
        let parsed: DatasetYaml = serde_yaml::from_str(src)
            .map_err(|e| DomainError::InvalidInput(format!("labels yaml: {e}")))?;
        Ok(match parsed.names {
            YamlNames::List(list) => Self::from_names(list),
            YamlNames::Map(names) => Self { names },
        })
    }

    /// Parses the `names` entry exported into model metadata, a dict literal
    /// such as `{0: 'person', 1: "traffic light"}`. Flow-style YAML accepts
    /// the same syntax.
    pub fn from_model_names(src: &str) -> DomainResult<Self> {
        let names: BTreeMap<usize, String> = serde_yaml::from_str(src)
            .map_err(|e| DomainError::InvalidInput(format!("model names metadata: {e}")))?;
        Ok(Self { names })
    }

    /// One label per line; blank lines are skipped.
    pub fn from_lines(src: &str) -> Self {
        Self::from_names(
            src.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn load(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|e| DomainError::NotFound(format!("labels file {}: {e}", path.display())))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&src),
            _ => Ok(Self::from_lines(&src)),
        }
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Label names ordered by class id.
    pub fn names(&self) -> Vec<String> {
        self.names.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn names_are_indexed_in_order() {
        let table = ClassLabelTable::from_names(["cat", "dog"]);
        assert_eq!(table.get(0), Some("cat"));
        assert_eq!(table.get(1), Some("dog"));
        assert_eq!(table.get(2), None);
        assert_eq!(table.names(), vec!["cat", "dog"]);
    }

    #[test]
    fn yaml_accepts_list_and_map() {
        let list = ClassLabelTable::from_yaml("path: data\nnames: [qiwu, xuhao, tuzhu]\n").unwrap();
        assert_eq!(list.get(2), Some("tuzhu"));

        let map = ClassLabelTable::from_yaml("names:\n  0: person\n  5: bus\n").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(5), Some("bus"));
        assert_eq!(map.get(1), None);
    }

    #[test]
    fn yaml_without_names_is_rejected() {
        let err = ClassLabelTable::from_yaml("nc: 3\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn parses_model_names_metadata() {
        let table =
            ClassLabelTable::from_model_names("{0: 'person', 1: 'bicycle', 9: \"traffic light\", 10: \"o'clock\"}")
                .unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(0), Some("person"));
        assert_eq!(table.get(1), Some("bicycle"));
        assert_eq!(table.get(9), Some("traffic light"));
        assert_eq!(table.get(10), Some("o'clock"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn malformed_model_names_are_rejected() {
        let err = ClassLabelTable::from_model_names("['person', 'bicycle']").unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn loads_text_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "muzang\n\n  zhengti  ").unwrap();

        let table = ClassLabelTable::load(file.path()).unwrap();
        assert_eq!(table.names(), vec!["muzang", "zhengti"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ClassLabelTable::load("/nonexistent/labels.yaml").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
