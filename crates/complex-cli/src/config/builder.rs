use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use pdbcomplex::engine::config::AnalysisConfigBuilder;
use pdbcomplex::workflows::analyze::InputPaths;
use std::path::PathBuf;

pub fn build_config(args: &AnalyzeArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.config {
        Some(config_path) => FileConfig::from_file(config_path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let input_file = file_config.input.take().unwrap_or_default();
    let output_file = file_config.output.take().unwrap_or_default();
    let identifiers_file = file_config.identifiers.take().unwrap_or_default();
    let extraction_file = file_config.extraction.take().unwrap_or_default();

    let inputs = InputPaths {
        participation: required(&args.participation, input_file.participation, "input.participation", "--participation")?,
        complexes: required(&args.complexes, input_file.complexes, "input.complexes", "--complexes")?,
        components: required(&args.components, input_file.components, "input.components", "--components")?,
        cross_references: required(&args.xrefs, input_file.cross_references, "input.cross-references", "--xrefs")?,
        organisms: args.organisms.clone().or(input_file.organisms),
    };
    let report_path = required(&args.output, output_file.report, "output.report", "--output")?;
    let graph_path = args.graph.clone().or(output_file.graph);

    let id_prefix = args
        .id_prefix
        .clone()
        .or(identifiers_file.prefix)
        .unwrap_or(defaults.id_prefix);
    let preferred_assemblies_only = if args.include_all_assemblies {
        false
    } else {
        extraction_file
            .preferred_assemblies_only
            .unwrap_or(defaults.preferred_assemblies_only)
    };

    let core_config = AnalysisConfigBuilder::new()
        .id_prefix(id_prefix)
        .preferred_assemblies_only(preferred_assemblies_only)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        inputs,
        report_path,
        graph_path,
        core_config,
    })
}

fn required(
    cli_arg: &Option<PathBuf>,
    file_arg: Option<PathBuf>,
    key: &str,
    flag: &str,
) -> Result<PathBuf> {
    cli_arg.clone().or(file_arg).ok_or_else(|| {
        CliError::Config(format!(
            "A value for '{}' is required either in the config file or via {}.",
            key, flag
        ))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let path = || Some(PathBuf::from(value_str));

        match key {
            "input.participation" => {
                config.input.get_or_insert_with(Default::default).participation = path();
            }
            "input.complexes" => {
                config.input.get_or_insert_with(Default::default).complexes = path();
            }
            "input.components" => {
                config.input.get_or_insert_with(Default::default).components = path();
            }
            "input.cross-references" => {
                config.input.get_or_insert_with(Default::default).cross_references = path();
            }
            "input.organisms" => {
                config.input.get_or_insert_with(Default::default).organisms = path();
            }
            "output.report" => {
                config.output.get_or_insert_with(Default::default).report = path();
            }
            "output.graph" => {
                config.output.get_or_insert_with(Default::default).graph = path();
            }
            "identifiers.prefix" => {
                config.identifiers.get_or_insert_with(Default::default).prefix =
                    Some(value_str.to_string());
            }
            "extraction.preferred-assemblies-only" => {
                config
                    .extraction
                    .get_or_insert_with(Default::default)
                    .preferred_assemblies_only = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                })?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
