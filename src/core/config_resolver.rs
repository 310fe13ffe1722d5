//! # Settings View
//!
//! A read/query/mutate façade over a settings chain.
//!
//! Reads always go through the merged view of the whole chain. Writes never
//! do: every targeted file is re-read on its own, changed and rewritten in
//! full, so a mutation only ever sees that file's own content.
//!
//! A cascaded write targets every file except the project settings file at
//! index 0 and is not transactional: if writing file `i` fails, files before
//! `i` stay changed.

use crate::{
    core::settings::{self, SettingsResult},
    models::{ChainEntry, Setting, Settings},
};

#[derive(Debug, Clone)]
pub struct SettingsView {
    files: Vec<ChainEntry>,
}

impl SettingsView {
    /// Creates a view over a chain ordered root first, most specific last.
    pub fn new(files: Vec<ChainEntry>) -> Self {
        Self { files }
    }

    /// Folds the chain left to right with `nested_merge`.
    pub fn merged(&self) -> SettingsResult<Settings> {
        self.files.iter().try_fold(Settings::new(), |acc, entry| {
            Ok(settings::nested_merge(
                acc,
                settings::read_settings(&entry.file)?,
            ))
        })
    }

    /// Returns the value of a dotted parameter path in the merged view.
    pub fn get(&self, para: &str) -> SettingsResult<String> {
        settings::get_text(&self.merged()?, para)
    }

    /// Sets (`Some`) or deletes (`None`) a parameter.
    ///
    /// Without `cascade` only the most specific file is changed. With
    /// `cascade` every file but the project settings file is changed.
    /// Files that do not hold a deleted key are left untouched.
    /// Returns the number of files rewritten.
    pub fn set(&self, para: &str, value: Option<&str>, cascade: bool) -> SettingsResult<usize> {
        settings::terminal_key(para)?;

        let start = if cascade {
            1
        } else {
            self.files.len().saturating_sub(1)
        };

        let mut rewritten = 0;
        for entry in self.files.iter().skip(start) {
            let mut file_settings = settings::read_settings(&entry.file)?;
            let changed =
                settings::update_value(&mut file_settings, para, value.map(Setting::text))?;
            if !changed {
                log::debug!(
                    "'{}' not present in context '{}', nothing to delete.",
                    para,
                    entry.context
                );
                continue;
            }
            settings::write_settings(&entry.file, &file_settings)?;
            rewritten += 1;
            log::debug!(
                "{} '{}' in context '{}'.",
                if value.is_some() { "Set" } else { "Deleted" },
                para,
                entry.context
            );
        }
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        context_resolver::resolve_context, settings::SettingsError,
        test_support::project_fixture,
    };
    use std::fs;

    fn view_at(fixture: &crate::core::test_support::Fixture, dir: &str) -> SettingsView {
        resolve_context(&fixture.path(dir))
            .unwrap()
            .context_settings()
            .unwrap()
    }

    fn assert_unknown(view: &SettingsView, para: &str) {
        assert!(matches!(
            view.get(para),
            Err(SettingsError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_get_merges_chain() {
        let fixture = project_fixture();
        for dir in ["db", "db/sub"] {
            let view = view_at(&fixture, dir);
            assert_eq!(view.get("a").unwrap(), "1");
            assert_eq!(view.get("b").unwrap(), "1");
            assert_eq!(view.get("c").unwrap(), "2");
        }

        let root_view = view_at(&fixture, "");
        assert_eq!(root_view.get("b").unwrap(), "2");
        assert_unknown(&root_view, "c");
    }

    #[test]
    fn test_project_settings_ignore_contexts() {
        let fixture = project_fixture();
        let view = resolve_context(&fixture.path("db"))
            .unwrap()
            .project_settings();
        assert_eq!(view.get("a").unwrap(), "1");
        assert_eq!(view.get("b").unwrap(), "2");
        assert_unknown(&view, "c");
    }

    #[test]
    fn test_set_targets_most_specific_file() {
        let fixture = project_fixture();
        let sub = resolve_context(&fixture.path("db/sub")).unwrap();
        sub.create_context().unwrap();

        assert_eq!(sub.context_settings().unwrap().set("c", Some("1"), false).unwrap(), 1);
        assert_eq!(view_at(&fixture, "db/sub").get("c").unwrap(), "1");
        assert_eq!(view_at(&fixture, "db").get("c").unwrap(), "2");
    }

    #[test]
    fn test_cascade_skips_project_settings() {
        let fixture = project_fixture();
        let sub = resolve_context(&fixture.path("db/sub")).unwrap();
        sub.create_context().unwrap();

        let rewritten = sub.context_settings().unwrap().set("c", Some("1"), true).unwrap();
        assert_eq!(rewritten, 2);
        assert_eq!(view_at(&fixture, "db").get("c").unwrap(), "1");
        assert_eq!(view_at(&fixture, "db/sub").get("c").unwrap(), "1");
        assert_unknown(&view_at(&fixture, ""), "c");
        assert_eq!(view_at(&fixture, "").get("a").unwrap(), "1");

        sub.context_settings().unwrap().set("c", None, true).unwrap();
        assert_unknown(&view_at(&fixture, "db/sub"), "c");
        assert_unknown(&view_at(&fixture, "db"), "c");
        assert_eq!(view_at(&fixture, "db/sub").get("b").unwrap(), "1");
    }

    #[test]
    fn test_delete_keeps_ancestor_value() {
        let fixture = project_fixture();
        let sub = resolve_context(&fixture.path("db/sub")).unwrap();
        sub.create_context().unwrap();
        sub.context_settings().unwrap().set("b", Some("5"), false).unwrap();
        assert_eq!(view_at(&fixture, "db/sub").get("b").unwrap(), "5");

        sub.context_settings().unwrap().set("b", None, false).unwrap();
        assert_eq!(view_at(&fixture, "db/sub").get("b").unwrap(), "1");
        assert_eq!(view_at(&fixture, "db").get("b").unwrap(), "1");
    }

    #[test]
    fn test_delete_of_absent_key_does_not_create_files() {
        let fixture = project_fixture();
        let sub = resolve_context(&fixture.path("db/sub")).unwrap();
        let entry = sub.create_context().unwrap();

        let rewritten = sub.context_settings().unwrap().set("nope", None, true).unwrap();
        assert_eq!(rewritten, 0);
        assert!(!entry.file.exists());
    }

    #[test]
    fn test_set_nested_parameters() {
        let fixture = project_fixture();
        let view = view_at(&fixture, "db");
        view.set("db.host", Some("localhost"), false).unwrap();
        assert_eq!(view.get("db.host").unwrap(), "localhost");
        assert_unknown(&view, "db");

        assert!(matches!(
            view.set("b.host", Some("x"), false),
            Err(SettingsError::PathConflict { .. })
        ));
        assert!(matches!(
            view.set("db. ", Some("x"), true),
            Err(SettingsError::InvalidParameterPath(_))
        ));
    }

    #[test]
    fn test_set_rewrites_only_the_target_file() {
        let fixture = project_fixture();
        view_at(&fixture, "db").set("d", Some("4"), false).unwrap();

        let root_content = fs::read_to_string(fixture.root.settings_file()).unwrap();
        assert_eq!(root_content, "a: 1\nb: 2\n");
        let context_content =
            fs::read_to_string(fixture.root.context_dir().join("A.yaml")).unwrap();
        assert!(context_content.contains("d:"));
        assert!(context_content.contains("c: 2"));
    }
}
