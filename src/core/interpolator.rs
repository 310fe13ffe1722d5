//! # Command Template Renderer
//!
//! Turns a [`Template`] into the text that is actually run.
//!
//! VAR component values are split into tokens once, when the template is
//! loaded (`tokenize`). Rendering then walks those tokens: literals pass
//! through, every `[[name]]` reference is looked up in the caller's overrides
//! first and in the merged settings second. Components that name an input
//! file or directory are finally checked against the file system by
//! searching from the working directory up to the project base directory.

use crate::{
    constants::{VAR_CLOSE, VAR_OPEN},
    core::{
        config_resolver::SettingsView,
        settings::{self, SettingsError},
    },
    models::{CommandType, Component, IoType, Settings, Template, Token},
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unterminated variable reference at position {position} in '{value}'.")]
    Unterminated { value: String, position: usize },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Unresolved variable '{0}'.")]
    UnresolvedVariable(String),
    #[error("Input {io_type} '{name}' not found in the working directory or any parent.")]
    InputNotFound { name: String, io_type: IoType },
    #[error("Input path cannot be placed on a command line: {0}")]
    Quote(#[from] shlex::QuoteError),
}

type RenderResult<T> = Result<T, RenderError>;

// --- Lexer ---

/// Splits a VAR component value into literal text and `[[name]]` references.
///
/// An open marker without a matching close marker, or a second open marker
/// before the close marker, is an error. A close marker with no open marker
/// is plain text.
pub fn tokenize(value: &str) -> Result<Vec<Token>, TokenError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = value;

    while let Some(start) = rest.find(VAR_OPEN) {
        let position = value.len() - rest.len() + start;
        let unterminated = || TokenError::Unterminated {
            value: value.to_string(),
            position,
        };

        let (before, reference) = rest.split_at(start);
        literal.push_str(before);
        let reference = reference.strip_prefix(VAR_OPEN).unwrap_or(reference);

        let end = reference.find(VAR_CLOSE).ok_or_else(unterminated)?;
        let (name, after) = reference.split_at(end);
        if name.contains(VAR_OPEN) {
            return Err(unterminated());
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(Token::Variable(name.to_string()));
        rest = after.strip_prefix(VAR_CLOSE).unwrap_or(after);
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Rebuilds the raw value a token list was parsed from.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| match token {
            Token::Literal(text) => text.clone(),
            Token::Variable(name) => format!("{}{}{}", VAR_OPEN, name, VAR_CLOSE),
        })
        .collect()
}

// --- Input resolution ---

/// Search path for input files and directories.
#[derive(Debug, Clone)]
pub struct InputLocator {
    /// The working directory first, then each ancestor up to the base directory.
    search_dirs: Vec<PathBuf>,
}

impl InputLocator {
    pub fn new(work_dir: &Path, base_dir: &Path) -> Self {
        let search_dirs = work_dir
            .ancestors()
            .take_while(|dir| dir.starts_with(base_dir))
            .map(Path::to_path_buf)
            .collect();
        Self { search_dirs }
    }

    /// Finds the closest `name` of the given type.
    ///
    /// Relative names come back relative to the working directory (`name`,
    /// `../name`, ...). Absolute names are returned unchanged when they exist.
    /// Either form is valid for a process started in the working directory.
    pub fn locate(&self, name: &str, io_type: IoType) -> Option<String> {
        let exists = |path: &Path| match io_type {
            IoType::File => path.is_file(),
            IoType::Dir => path.is_dir(),
        };

        if Path::new(name).is_absolute() {
            return exists(Path::new(name)).then(|| name.to_string());
        }

        let depth = self
            .search_dirs
            .iter()
            .position(|dir| exists(&dir.join(name)))?;

        let mut relative = PathBuf::new();
        for _ in 0..depth {
            relative.push("..");
        }
        relative.push(name);
        Some(relative.to_string_lossy().into_owned())
    }
}

// --- Renderer ---

/// The rendered form of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    /// One resolved string per template component.
    pub components: Vec<String>,
    /// The components joined with single spaces. For EXEC templates, input
    /// paths are shell-quoted so they survive word splitting.
    pub command_line: String,
}

#[derive(Debug)]
pub struct Interpolator<'a> {
    settings: Settings,
    overrides: &'a HashMap<String, String>,
    locator: &'a InputLocator,
}

impl<'a> Interpolator<'a> {
    /// Merges the settings chain once; every lookup then works on that snapshot.
    pub fn new(
        view: &SettingsView,
        overrides: &'a HashMap<String, String>,
        locator: &'a InputLocator,
    ) -> RenderResult<Self> {
        Ok(Self {
            settings: view.merged()?,
            overrides,
            locator,
        })
    }

    /// Resolves a variable name: overrides first, then the merged settings.
    pub fn lookup(&self, name: &str) -> RenderResult<String> {
        if let Some(value) = self.overrides.get(name) {
            return Ok(value.clone());
        }
        match settings::get_text(&self.settings, name) {
            Ok(value) => Ok(value),
            Err(SettingsError::UnknownParameter(_)) => {
                Err(RenderError::UnresolvedVariable(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn render_component(&self, component: &Component) -> RenderResult<String> {
        let mut rendered = String::new();
        for token in component.tokens() {
            match token {
                Token::Literal(text) => rendered.push_str(text),
                Token::Variable(name) => rendered.push_str(&self.lookup(name)?),
            }
        }

        match component.io_type.filter(|_| component.is_input()) {
            Some(io_type) => match self.locator.locate(&rendered, io_type) {
                Some(path) => Ok(path),
                None => Err(RenderError::InputNotFound {
                    name: rendered,
                    io_type,
                }),
            },
            None => Ok(rendered),
        }
    }

    pub fn render(&self, template: &Template) -> RenderResult<RenderedCommand> {
        let components = template
            .components
            .iter()
            .map(|component| self.render_component(component))
            .collect::<RenderResult<Vec<_>>>()?;

        let command_line = match template.command_type {
            CommandType::Exec => template
                .components
                .iter()
                .zip(&components)
                .map(|(component, value)| -> RenderResult<String> {
                    if component.is_input() {
                        Ok(shlex::try_quote(value)?.into_owned())
                    } else {
                        Ok(value.clone())
                    }
                })
                .collect::<RenderResult<Vec<_>>>()?
                .join(" "),
            CommandType::Sql => components.join(" "),
        };

        log::debug!("Rendered '{}': {:?}", template.name, components);
        Ok(RenderedCommand {
            command_line,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{context_resolver::resolve_context, test_support::project_fixture};
    use crate::models::ComponentKind;
    use std::fs;

    fn var(value: &str) -> Component {
        Component::new(ComponentKind::Var, value, None, false).unwrap()
    }

    fn input(value: &str, io_type: IoType) -> Component {
        Component::new(ComponentKind::Var, value, Some(io_type), true).unwrap()
    }

    fn template(components: Vec<Component>) -> Template {
        Template {
            name: "test".to_string(),
            command_type: CommandType::Exec,
            components,
            description: None,
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("report-[[year]].csv").unwrap(),
            vec![
                Token::Literal("report-".to_string()),
                Token::Variable("year".to_string()),
                Token::Literal(".csv".to_string()),
            ]
        );
        assert_eq!(
            tokenize("[[a]][[b.c]]").unwrap(),
            vec![
                Token::Variable("a".to_string()),
                Token::Variable("b.c".to_string()),
            ]
        );
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(
            tokenize("plain ]] text").unwrap(),
            vec![Token::Literal("plain ]] text".to_string())]
        );
    }

    #[test]
    fn test_tokenize_reconstructs_value() {
        for value in ["a [[x]] b", "[[x]]", "--in=[[dir]]/[[file]]", "x]]y", "[[]]"] {
            let tokens = tokenize(value).unwrap();
            assert_eq!(join_tokens(&tokens), value);
            assert_eq!(tokenize(value).unwrap(), tokens);
        }
    }

    #[test]
    fn test_tokenize_rejects_unterminated_references() {
        assert_eq!(
            tokenize("in-[[name"),
            Err(TokenError::Unterminated {
                value: "in-[[name".to_string(),
                position: 3,
            })
        );
        assert!(tokenize("[[a [[b]]").is_err());
        assert!(tokenize("[[a]] [[").is_err());
    }

    #[test]
    fn test_render_with_settings_and_overrides() {
        let fixture = project_fixture();
        let context = resolve_context(&fixture.path("db")).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::from([("year".to_string(), "2023".to_string())]);

        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();
        let rendered = interpolator
            .render(&template(vec![
                Component::constant("echo [[a]]"),
                var("report-[[year]].csv"),
                var("[[a]]-[[b]]-[[c]]"),
            ]))
            .unwrap();

        assert_eq!(
            rendered.components,
            vec!["echo [[a]]", "report-2023.csv", "1-1-2"]
        );
        assert_eq!(rendered.command_line, "echo [[a]] report-2023.csv 1-1-2");
    }

    #[test]
    fn test_overrides_win_over_settings() {
        let fixture = project_fixture();
        let context = resolve_context(&fixture.path("db")).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::from([("b".to_string(), "9".to_string())]);

        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();
        assert_eq!(interpolator.lookup("b").unwrap(), "9");
        assert_eq!(interpolator.lookup("a").unwrap(), "1");
    }

    #[test]
    fn test_unresolved_variable() {
        let fixture = project_fixture();
        let context = resolve_context(fixture.root.base_dir()).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::new();

        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();
        assert!(matches!(
            interpolator.render(&template(vec![var("[[c]]")])),
            Err(RenderError::UnresolvedVariable(name)) if name == "c"
        ));
        assert!(matches!(
            interpolator.render(&template(vec![var("[[]]")])),
            Err(RenderError::UnresolvedVariable(_))
        ));
    }

    #[test]
    fn test_input_resolution_searches_parents() {
        let fixture = project_fixture();
        fs::write(fixture.path("db/local.csv"), "x").unwrap();
        fs::write(fixture.path("db/sub/here.csv"), "x").unwrap();
        fs::create_dir(fixture.path("db/data")).unwrap();

        let context = resolve_context(&fixture.path("db/sub")).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::from([("name".to_string(), "local".to_string())]);
        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();

        let located = interpolator
            .render_component(&input("[[name]].csv", IoType::File))
            .unwrap();
        assert_eq!(PathBuf::from(located), Path::new("..").join("local.csv"));
        assert_eq!(
            interpolator
                .render_component(&input("here.csv", IoType::File))
                .unwrap(),
            "here.csv"
        );
        assert_eq!(
            PathBuf::from(
                interpolator
                    .render_component(&input("data", IoType::Dir))
                    .unwrap()
            ),
            Path::new("..").join("data")
        );
    }

    #[test]
    fn test_input_paths_with_spaces_stay_one_argument() {
        let fixture = project_fixture();
        fs::create_dir(fixture.path("db/my data")).unwrap();
        fs::write(fixture.path("db/my data/in.csv"), "x").unwrap();

        let context = resolve_context(&fixture.path("db")).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::from([("f".to_string(), "my data/in.csv".to_string())]);
        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();

        let rendered = interpolator
            .render(&template(vec![
                Component::constant("cat"),
                input("[[f]]", IoType::File),
            ]))
            .unwrap();

        assert_eq!(rendered.components, vec!["cat", "my data/in.csv"]);
        assert_eq!(
            shlex::split(&rendered.command_line).unwrap(),
            vec!["cat", "my data/in.csv"]
        );
    }

    #[test]
    fn test_sql_inputs_are_not_quoted() {
        let fixture = project_fixture();
        fs::write(fixture.path("db/my file.csv"), "x").unwrap();

        let context = resolve_context(&fixture.path("db")).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::new();
        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();

        let mut sql = template(vec![
            Component::constant("COPY t FROM"),
            input("my file.csv", IoType::File),
        ]);
        sql.command_type = CommandType::Sql;
        assert_eq!(
            interpolator.render(&sql).unwrap().command_line,
            "COPY t FROM my file.csv"
        );
    }

    #[test]
    fn test_input_type_must_match() {
        let fixture = project_fixture();
        fs::create_dir(fixture.path("db/data")).unwrap();
        let context = resolve_context(&fixture.path("db")).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::new();
        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();

        assert!(matches!(
            interpolator.render_component(&input("data", IoType::File)),
            Err(RenderError::InputNotFound { name, io_type: IoType::File }) if name == "data"
        ));
    }

    #[test]
    fn test_outputs_are_not_checked() {
        let fixture = project_fixture();
        let context = resolve_context(&fixture.path("db")).unwrap();
        let view = context.context_settings().unwrap();
        let locator = context.input_locator();
        let overrides = HashMap::new();
        let interpolator = Interpolator::new(&view, &overrides, &locator).unwrap();

        let output = Component::new(ComponentKind::Var, "out-[[a]].csv", Some(IoType::File), false)
            .unwrap();
        assert_eq!(interpolator.render_component(&output).unwrap(), "out-1.csv");
    }

    #[test]
    fn test_absolute_inputs_are_checked_in_place() {
        let fixture = project_fixture();
        let outside = tempfile::tempdir().unwrap();
        let file = outside.path().join("abs.csv");
        fs::write(&file, "x").unwrap();

        let locator = InputLocator::new(&fixture.path("db"), fixture.root.base_dir());
        let name = file.to_string_lossy().into_owned();
        assert_eq!(locator.locate(&name, IoType::File), Some(name.clone()));
        assert_eq!(locator.locate(&name, IoType::Dir), None);
    }
}
