#![deny(missing_docs)]

//! # Generator
//!
//! Reads an OpenAPI document, compiles it and writes the generated models
//! and handler interface next to each other in the output directory.

use crate::error::{CliError, CliResult};
use oasgen_core::{
    compile_str, generate_sources, generated_header, CompilerConfig, Emitter, FieldNaming,
    PathStyle,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for a generation run. Every flag falls back to an `OASGEN_*`
/// environment variable.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// OpenAPI 3.x document (YAML or JSON).
    #[clap(long, env = "OASGEN_SPEC")]
    pub spec: PathBuf,

    /// Directory the generated files are written to.
    #[clap(long, env = "OASGEN_PATH", default_value = ".")]
    pub path: PathBuf,

    /// File name of the handler interface.
    #[clap(long, env = "OASGEN_OUTPUT", default_value = "handlers.rs")]
    pub output: PathBuf,

    /// File name of the models.
    #[clap(long, env = "OASGEN_MODELS", default_value = "models.rs")]
    pub models: PathBuf,

    /// Name of the generated handler trait [default: Handlers].
    #[clap(long, env = "OASGEN_TYPE_NAME")]
    pub type_name: Option<String>,

    /// Route placeholder syntax: `colon` (/board/:row) or `braces` (/board/{row}).
    #[clap(long, env = "OASGEN_PATH_STYLE")]
    pub path_style: Option<PathStyle>,

    /// Nested type naming: `prefixed` (StatusWinner) or `bare` (Winner).
    #[clap(long, env = "OASGEN_FIELD_NAMING")]
    pub field_naming: Option<FieldNaming>,

    /// Module path the handler file imports models from [default: crate::models].
    #[clap(long, env = "OASGEN_MODELS_PATH")]
    pub models_path: Option<String>,

    /// Compiler config file (YAML). Flags override its values.
    #[clap(long, env = "OASGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the compiled model as YAML instead of writing sources.
    #[clap(long)]
    pub dump_model: bool,
}

/// Builds the compiler config: file values first, then flags.
pub fn load_config(args: &GenerateArgs) -> CliResult<CompilerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("failed to read {}: {}", path.display(), e))
            })?;
            serde_yaml::from_str::<CompilerConfig>(&raw)
                .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?
        }
        None => CompilerConfig::default(),
    };

    if let Some(name) = &args.type_name {
        config.interface_name = name.clone();
    }
    if let Some(style) = args.path_style {
        config.path_style = style;
    }
    if let Some(naming) = args.field_naming {
        config.field_naming = naming;
    }
    if let Some(models_path) = &args.models_path {
        config.models_path = models_path.clone();
    }
    Ok(config)
}

/// Executes a generation run.
///
/// # Arguments
///
/// * `args` - Command arguments.
/// * `emitter` - The emission backend.
/// * `command_line` - Recorded in the generated file header.
///
/// # Returns
///
/// The paths written, models first. Empty for `--dump-model`.
pub fn execute(
    args: &GenerateArgs,
    emitter: &impl Emitter,
    command_line: &str,
) -> CliResult<Vec<PathBuf>> {
    let config = load_config(args)?;

    let content = fs::read_to_string(&args.spec).map_err(|e| {
        CliError::General(format!(
            "failed to read OpenAPI document {}: {}",
            args.spec.display(),
            e
        ))
    })?;
    tracing::debug!(spec = %args.spec.display(), ?config, "compiling");
    let api = compile_str(&content, &config)?;

    if args.dump_model {
        let yaml = serde_yaml::to_string(&api)
            .map_err(|e| CliError::General(format!("failed to serialize model: {}", e)))?;
        println!("{}", yaml);
        return Ok(Vec::new());
    }

    let header = generated_header(command_line);
    let sources = generate_sources(&api, emitter, &config, &header)?;

    fs::create_dir_all(&args.path)?;
    let models_path = args.path.join(&args.models);
    let interface_path = args.path.join(&args.output);
    write_file(&models_path, &sources.models)?;
    write_file(&interface_path, &sources.interface)?;

    tracing::info!(
        models = %models_path.display(),
        handlers = %interface_path.display(),
        types = api.types.len(),
        operations = api.operations.len(),
        "generated sources"
    );
    Ok(vec![models_path, interface_path])
}

fn write_file(path: &Path, content: &str) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasgen_core::{AppError, RustEmitter};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const SPEC: &str = r#"
openapi: 3.0.3
info: {title: Board, version: 1.0.0}
paths:
  /board/{row}:
    get:
      operationId: getRow
      parameters:
        - {name: row, in: path, required: true, schema: {type: integer}}
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Row'}
components:
  schemas:
    Row:
      type: array
      items: {type: string, maxLength: 1}
"#;

    fn args(spec: PathBuf, out: PathBuf) -> GenerateArgs {
        GenerateArgs {
            spec,
            path: out,
            output: PathBuf::from("handlers.rs"),
            models: PathBuf::from("models.rs"),
            type_name: None,
            path_style: None,
            field_naming: None,
            models_path: None,
            config: None,
            dump_model: false,
        }
    }

    #[test]
    fn test_writes_both_files() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        fs::write(&spec, SPEC).unwrap();
        let out = dir.path().join("gen");

        let written = execute(
            &args(spec, out.clone()),
            &RustEmitter::new(),
            "oasgen --spec openapi.yaml",
        )
        .unwrap();
        assert_eq!(written, vec![out.join("models.rs"), out.join("handlers.rs")]);

        let models = fs::read_to_string(out.join("models.rs")).unwrap();
        assert!(models.starts_with("// Code generated by oasgen. DO NOT EDIT.\n// Command: oasgen --spec openapi.yaml\n"));
        assert!(models.contains("pub struct Row(pub Vec<RowItem>);"));

        let handlers = fs::read_to_string(out.join("handlers.rs")).unwrap();
        assert!(handlers.contains("pub trait Handlers {"));
        assert!(handlers.contains("(\"GET\", \"/board/:row\", \"get_row\")"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("oasgen.yaml");
        fs::write(
            &config_path,
            "interface-name: BoardApi\npath-style: braces\nfield-naming: bare\n",
        )
        .unwrap();

        let mut a = args(dir.path().join("unused.yaml"), dir.path().to_path_buf());
        a.config = Some(config_path);
        a.path_style = Some(PathStyle::Colon);

        let config = load_config(&a).unwrap();
        assert_eq!(config.interface_name, "BoardApi");
        assert_eq!(config.path_style, PathStyle::Colon);
        assert_eq!(config.field_naming, FieldNaming::Bare);
    }

    #[test]
    fn test_bad_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("oasgen.yaml");
        fs::write(&config_path, "path-style: diagonal\n").unwrap();
        let mut a = args(dir.path().join("unused.yaml"), dir.path().to_path_buf());
        a.config = Some(config_path);
        assert!(matches!(load_config(&a), Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_spec_file() {
        let dir = tempdir().unwrap();
        let a = args(dir.path().join("missing.yaml"), dir.path().to_path_buf());
        let err = execute(&a, &RustEmitter::new(), "oasgen").unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[test]
    fn test_compile_errors_propagate() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        fs::write(
            &spec,
            "openapi: 3.0.0\npaths:\n  /x:\n    get:\n      responses: {}\n",
        )
        .unwrap();
        let err = execute(&args(spec, dir.path().to_path_buf()), &RustEmitter::new(), "oasgen")
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Compile(AppError::MissingOperationId { .. })
        ));
        assert!(!dir.path().join("models.rs").exists());
    }
}
