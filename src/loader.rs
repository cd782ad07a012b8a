//! Reading class model documents and settings from disk.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use serde_json::Value;

use crate::model::{ClassInfo, ClassModelDocument, ClassPath};
use crate::path_de;
use crate::settings::Settings;

/// Where class model documents come from and how to narrow them.
#[derive(Debug, Clone, Default)]
pub struct ModelSource {
    /// Literal paths or glob patterns.
    pub inputs: Vec<String>,
    /// JSON Pointer applied to each file before jq.
    pub json_pointer: Option<String>,
    /// jq filter; each output is a separate class model document.
    pub jq_expr: Option<String>,
}

impl ModelSource {
    /// Read every input (in parallel) and merge them into one class path.
    /// Files keep their command-line order, so the first definition wins.
    pub fn load_class_path(&self) -> Result<ClassPath> {
        let source_paths = resolve_file_path_patterns(&self.inputs)?;
        let per_file = source_paths
            .par_iter()
            .map(|path| self.load_file(path))
            .collect::<Result<Vec<_>>>()?;
        let class_path: ClassPath = per_file.into_iter().flatten().collect();
        tracing::info!(files = source_paths.len(), classes = class_path.len(), "class path loaded");
        Ok(class_path)
    }

    fn load_file(&self, source_path: &Path) -> Result<Vec<ClassInfo>> {
        let source_path_str = source_path.to_string_lossy().to_string();
        let source = std::fs::read(source_path)
            .with_context(|| format!("failed to read source file ({source_path_str})"))?;
        let json_value = serde_json::from_slice::<Value>(&source)
            .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;

        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(pointer) => json_value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in ({source_path_str})"))?,
        };

        let documents = match self.jq_expr.as_deref() {
            None => vec![json_value],
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &json_value)
                .with_context(|| format!("failed to apply jq expression to source file ({source_path_str})"))?,
        };

        let mut classes = Vec::new();
        for document in documents {
            let document = path_de::from_value_with_path::<ClassModelDocument>(document)
                .with_context(|| format!("invalid class model in ({source_path_str})"))?;
            classes.extend(document.classes);
        }
        tracing::debug!(file = %source_path_str, classes = classes.len(), "class model read");
        Ok(classes)
    }
}

/// Defaults, or the given JSON settings file layered over them.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file ({})", path.display()))?;
    Settings::from_json_str(&source).with_context(|| format!("invalid settings file ({})", path.display()))
}

pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassRepository;
    use indoc::indoc;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn merges_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{ "classes": [{ "name": "com.example.A", "kind": "enum" }] }"#);
        write(dir.path(), "b.json", r#"{ "classes": [{ "name": "com.example.A" }, { "name": "com.example.B" }] }"#);

        let source = ModelSource {
            inputs: vec![
                dir.path().join("a.json").to_string_lossy().into_owned(),
                dir.path().join("b.json").to_string_lossy().into_owned(),
            ],
            ..ModelSource::default()
        };
        let classes = source.load_class_path().unwrap();
        assert_eq!(classes.len(), 2);
        assert!(classes.find_class("com.example.A").unwrap().is_enum());
    }

    #[test]
    fn pointer_and_jq_narrow_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bundle.json", indoc! {r#"
            {
              "build": {
                "modules": [
                  { "types": [{ "name": "com.example.A" }] },
                  { "types": [{ "name": "com.example.B" }] }
                ]
              }
            }
        "#});
        let source = ModelSource {
            inputs: vec![path.to_string_lossy().into_owned()],
            json_pointer: Some("/build".into()),
            jq_expr: Some(".modules[] | { classes: .types }".into()),
        };
        let classes = source.load_class_path().unwrap();
        assert_eq!(classes.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["com.example.A", "com.example.B"]);
    }

    #[test]
    fn decode_errors_name_file_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.json", r#"{ "classes": [{ "name": "com.example.A", "superclass": "Base<" }] }"#);
        let source = ModelSource { inputs: vec![path.to_string_lossy().into_owned()], ..ModelSource::default() };
        let err = format!("{:#}", source.load_class_path().unwrap_err());
        assert!(err.contains("bad.json"), "{err}");
        assert!(err.contains("classes[0].superclass"), "{err}");
    }

    #[test]
    fn globs_must_match() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.json", "{}");
        let found = resolve_file_path_patterns([dir.path().join("*.json").to_string_lossy()]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(resolve_file_path_patterns([dir.path().join("*.xml").to_string_lossy()]).is_err());
    }

    #[test]
    fn settings_file_is_optional() {
        assert_eq!(load_settings(None).unwrap().max_depth, Settings::default().max_depth);
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "settings.json", r#"{ "maxDepth": 3 }"#);
        assert_eq!(load_settings(Some(&path)).unwrap().max_depth, 3);
    }
}
