use crate::context::{Area, PresentationContext};
use crate::render::{
    BlockDefinition, DEFAULT_CONTENT_BLOCK, ElementType, HtmlRenderer, InlineTranslator,
    PageConfig, TemplateLayoutInitiator, ThemeFileResolver, ViewFileResolver,
};
use crate::validation::rules::{AllowedValuesValidator, PatternValidator, RequiredFieldValidator};
use crate::validation::{CompositeValidator, Validator};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_TEMPLATE: &str = "privacy/export/page.html";
const DEFAULT_CONTENT_TEMPLATE: &str = "privacy/export/personal_data.html";
const DEFAULT_THEME_ROOT: &str = "themes";
const DEFAULT_THEME: &str = "default";
const DEFAULT_OUTPUT_DIR: &str = "var/export";
const DEFAULT_TITLE: &str = "Personal Data Export";
const DEFAULT_LANG: &str = "en";

/// Page-level settings of the HTML export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub title: String,
    pub lang: String,
    pub charset: String,
    pub body_class: String,
    pub robots: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            lang: DEFAULT_LANG.to_string(),
            charset: "utf-8".to_string(),
            body_class: "privacy-export".to_string(),
            robots: "NOINDEX,NOFOLLOW".to_string(),
        }
    }
}

impl PageSettings {
    pub fn page_config(&self) -> PageConfig {
        PageConfig::new()
            .with_charset(&self.charset)
            .with_meta("robots", &self.robots)
            .with_title(&self.title)
            .with_element_attribute(ElementType::Html, "lang", &self.lang)
            .with_element_attribute(ElementType::Body, "class", &self.body_class)
    }
}

/// Rules the export payload is validated against before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayloadRules {
    pub required: Vec<String>,
    pub patterns: IndexMap<String, String>,
    pub allowed: IndexMap<String, Vec<String>>,
}

impl PayloadRules {
    /// Build one composite validator: required fields, then patterns, then
    /// allowed values.
    pub fn validator(&self) -> Result<CompositeValidator<Value>> {
        let mut validators: Vec<Box<dyn Validator<Value>>> = Vec::new();
        for field in &self.required {
            validators.push(Box::new(RequiredFieldValidator::new(field)));
        }
        for (field, pattern) in &self.patterns {
            let validator = PatternValidator::from_pattern(field, pattern)
                .with_context(|| format!("invalid pattern for field {field:?}"))?;
            validators.push(Box::new(validator));
        }
        for (field, allowed) in &self.allowed {
            validators.push(Box::new(AllowedValuesValidator::new(field, allowed.iter().cloned())));
        }
        Ok(CompositeValidator::new(validators))
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub template: String,
    pub area: Area,
    pub content_block: String,
    pub content_template: String,
    pub extra_blocks: Vec<BlockDefinition>,
    pub theme_root: PathBuf,
    pub themes: IndexMap<Area, String>,
    pub page: PageSettings,
    pub inline_translation: bool,
    pub output_dir: PathBuf,
    pub rules: PayloadRules,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::from_partial(PartialConfig::default(), None)
    }
}

impl ExportConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            theme_root: cli_theme_root,
            template: cli_template,
            area: cli_area,
            output_dir: cli_output_dir,
            inline_translation: cli_inline_translation,
            command: _,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let overrides = Overrides {
            theme_root: cli_theme_root,
            template: cli_template,
            area: cli_area,
            output_dir: cli_output_dir,
            inline_translation: cli_inline_translation,
        };
        let config = Self::from_partial(file_config, Some(overrides));
        config.validate()?;
        Ok(config)
    }

    fn from_partial(file: PartialConfig, overrides: Option<Overrides>) -> Self {
        let PartialConfig {
            template: file_template,
            area: file_area,
            content_block: file_content_block,
            content_template: file_content_template,
            extra_blocks: file_extra_blocks,
            theme_root: file_theme_root,
            themes: file_themes,
            page: file_page,
            inline_translation: file_inline_translation,
            output_dir: file_output_dir,
            rules: file_rules,
        } = file;
        let overrides = overrides.unwrap_or_default();

        let themes = file_themes
            .filter(|themes| !themes.is_empty())
            .unwrap_or_else(|| IndexMap::from([(Area::Frontend, DEFAULT_THEME.to_string())]));

        Self {
            template: overrides
                .template
                .or(file_template)
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            area: overrides.area.or(file_area).unwrap_or(Area::Frontend),
            content_block: file_content_block.unwrap_or_else(|| DEFAULT_CONTENT_BLOCK.to_string()),
            content_template: file_content_template
                .unwrap_or_else(|| DEFAULT_CONTENT_TEMPLATE.to_string()),
            extra_blocks: file_extra_blocks.unwrap_or_default(),
            theme_root: overrides
                .theme_root
                .or(file_theme_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_THEME_ROOT)),
            themes,
            page: file_page.unwrap_or_default(),
            inline_translation: overrides.inline_translation
                || file_inline_translation.unwrap_or(false),
            output_dir: overrides
                .output_dir
                .or(file_output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            rules: file_rules.unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.template.trim().is_empty(),
            "template name must not be empty"
        );
        anyhow::ensure!(
            !self.content_block.trim().is_empty(),
            "content block name must not be empty"
        );
        Ok(())
    }

    /// Checks that only matter once a page is rendered: the theme tree exists
    /// and the target area has a default theme.
    pub fn validate_for_render(&self) -> Result<()> {
        anyhow::ensure!(
            self.theme_root.is_dir(),
            "theme root {:?} is not a directory",
            self.theme_root
        );
        anyhow::ensure!(
            self.themes.contains_key(&self.area),
            "no default theme configured for area {}",
            self.area
        );
        Ok(())
    }

    /// Fresh presentation context with the configured default themes.
    pub fn presentation_context(&self) -> PresentationContext {
        PresentationContext::new(self.themes.clone())
    }

    /// Layout blocks: the content block first, then any extra blocks.
    pub fn layout_blocks(&self) -> Vec<BlockDefinition> {
        std::iter::once(BlockDefinition::new(
            &self.content_block,
            &self.content_template,
        ))
        .chain(self.extra_blocks.iter().cloned())
        .collect()
    }

    /// Wire an [`HtmlRenderer`] with the default collaborators.
    pub fn html_renderer(&self, context: &PresentationContext) -> Result<HtmlRenderer> {
        self.validate_for_render()?;
        let resolver: Arc<dyn ViewFileResolver> =
            Arc::new(ThemeFileResolver::new(&self.theme_root, context.clone()));
        let layout_initiator = TemplateLayoutInitiator::new(resolver.clone(), self.layout_blocks());

        HtmlRenderer::builder(context.clone(), &self.template)
            .area(self.area)
            .content_block(&self.content_block)
            .resolver(resolver)
            .layout_initiator(Arc::new(layout_initiator))
            .page_config(Arc::new(self.page.page_config()))
            .translator(Arc::new(InlineTranslator::new(self.inline_translation)))
            .build()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "privacy-export",
    about = "Validate and render personal data exports",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML, JSON or TOML)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "PRIVACY_EXPORT_THEME_ROOT",
        value_name = "DIR",
        help = "Directory containing area/theme template trees",
        global = true
    )]
    pub theme_root: Option<PathBuf>,

    #[arg(
        long,
        env = "PRIVACY_EXPORT_TEMPLATE",
        value_name = "NAME",
        help = "Logical name of the page template",
        global = true
    )]
    pub template: Option<String>,

    #[arg(
        long,
        env = "PRIVACY_EXPORT_AREA",
        value_enum,
        value_name = "AREA",
        help = "Area the export is rendered in",
        global = true
    )]
    pub area: Option<Area>,

    #[arg(
        long,
        env = "PRIVACY_EXPORT_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory export files are written to",
        global = true
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "PRIVACY_EXPORT_INLINE_TRANSLATION",
        help = "Annotate translated strings for inline editing",
        global = true
    )]
    pub inline_translation: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate a payload without rendering it
    Validate {
        #[arg(long, value_name = "FILE", help = "JSON payload to validate")]
        data: PathBuf,
    },
    /// Validate, render and store a payload
    Render {
        #[arg(long, value_name = "FILE", help = "JSON payload to render")]
        data: PathBuf,

        #[arg(long, value_name = "NAME", help = "Output file name without extension")]
        file_name: Option<String>,

        #[arg(long, help = "Also store the payload as JSON")]
        with_json: bool,
    },
}

#[derive(Debug, Default)]
struct Overrides {
    theme_root: Option<PathBuf>,
    template: Option<String>,
    area: Option<Area>,
    output_dir: Option<PathBuf>,
    inline_translation: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    template: Option<String>,
    area: Option<Area>,
    content_block: Option<String>,
    content_template: Option<String>,
    extra_blocks: Option<Vec<BlockDefinition>>,
    theme_root: Option<PathBuf>,
    #[serde(default, deserialize_with = "deserialize_themes")]
    themes: Option<IndexMap<Area, String>>,
    page: Option<PageSettings>,
    inline_translation: Option<bool>,
    output_dir: Option<PathBuf>,
    rules: Option<PayloadRules>,
}

/// Theme maps are keyed by area name; not every format can hand enum keys to
/// serde, so keys are parsed from strings.
fn deserialize_themes<'de, D>(deserializer: D) -> Result<Option<IndexMap<Area, String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, String>>::deserialize(deserializer)?;
    raw.map(|themes| {
        themes
            .into_iter()
            .map(|(area, theme)| {
                area.parse::<Area>()
                    .map(|area| (area, theme))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    })
    .transpose()
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        "toml" => toml::from_str(&contents)
            .with_context(|| format!("failed to parse TOML config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(config: Option<PathBuf>, theme_root: Option<PathBuf>) -> CliArgs {
        CliArgs {
            config,
            theme_root,
            template: None,
            area: None,
            output_dir: None,
            inline_translation: false,
            command: Command::Validate {
                data: PathBuf::from("payload.json"),
            },
        }
    }

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.template, DEFAULT_TEMPLATE);
        assert_eq!(config.area, Area::Frontend);
        assert_eq!(config.content_block, DEFAULT_CONTENT_BLOCK);
        assert_eq!(config.themes[&Area::Frontend], DEFAULT_THEME);
        assert_eq!(config.layout_blocks().len(), 1);
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.toml");
        fs::write(
            &path,
            r#"
template = "from/file.html"
output_dir = "file-out"

[themes]
frontend = "Opengento/luma"

[page]
title = "Your data"
"#,
        )
        .unwrap();

        let mut cli = args(Some(path), Some(dir.path().to_path_buf()));
        cli.output_dir = Some(PathBuf::from("cli-out"));
        let config = ExportConfig::from_args(cli).unwrap();

        assert_eq!(config.template, "from/file.html");
        assert_eq!(config.output_dir, PathBuf::from("cli-out"));
        assert_eq!(config.themes[&Area::Frontend], "Opengento/luma");
        assert_eq!(config.page.title, "Your data");
        assert_eq!(config.page.lang, DEFAULT_LANG);
    }

    #[test]
    fn test_missing_theme_root_only_fails_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let cli = args(None, Some(dir.path().join("nope")));
        let config = ExportConfig::from_args(cli).unwrap();

        let error = config
            .html_renderer(&config.presentation_context())
            .unwrap_err();
        assert!(error.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_area_without_theme_fails_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let mut cli = args(None, Some(dir.path().to_path_buf()));
        cli.area = Some(Area::Adminhtml);
        let config = ExportConfig::from_args(cli).unwrap();

        assert!(config.html_renderer(&config.presentation_context()).is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.yaml");
        fs::write(&path, "templat: typo.html\n").unwrap();
        assert!(load_config_file(&path).is_err());
    }

    #[test]
    fn test_payload_rules_validator() {
        let rules: PayloadRules = serde_json::from_value(json!({
            "required": ["email"],
            "patterns": { "email": "^[^@]+@[^@]+$" },
            "allowed": { "type": ["export"] }
        }))
        .unwrap();
        let mut validator = rules.validator().unwrap();
        assert_eq!(validator.len(), 3);

        assert!(validator.is_valid(&json!({ "email": "jane@example.com", "type": "export" })));
        assert!(!validator.is_valid(&json!({ "email": "nope", "type": "erase" })));
        assert_eq!(
            validator.messages().keys().collect::<Vec<_>>(),
            vec!["email", "type"]
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let rules = PayloadRules {
            patterns: IndexMap::from([("email".to_string(), "(".to_string())]),
            ..Default::default()
        };
        assert!(rules.validator().is_err());
    }
}
