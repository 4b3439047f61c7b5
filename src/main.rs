use std::env;
use std::path::PathBuf;
use std::process;

use hls_quality_probe::utils::validation::is_http_url;
use hls_quality_probe::{
    spawn_extraction_runtime, AppConfig, ExtractionError, ResolutionExtractor, ResolutionList,
    VariantInfo,
};

const USAGE: &str = "Usage: hls-probe <playlist-url> [--json] [--variants] [--config <path>]";

struct Options {
    url: String,
    json: bool,
    variants: bool,
    config_path: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut url = None;
    let mut json = false;
    let mut variants = false;
    let mut config_path = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--variants" => variants = true,
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => return Err(format!("Unknown option: {other}")),
            other => {
                if url.replace(other.to_string()).is_some() {
                    return Err("Only one playlist URL may be given".to_string());
                }
            }
        }
    }

    Ok(Options {
        url: url.ok_or_else(|| USAGE.to_string())?,
        json,
        variants,
        config_path,
    })
}

#[tokio::main]
async fn main() {
    hls_quality_probe::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            process::exit(2);
        }
    };

    if let Err(error) = run(options).await {
        eprintln!("Error: {error:#}");
        process::exit(1);
    }
}

async fn run(options: Options) -> anyhow::Result<()> {
    let config = match &options.config_path {
        Some(path) => AppConfig::load_from(Some(path.as_path()))?,
        None => AppConfig::load()?,
    };

    if !is_http_url(&options.url) {
        tracing::warn!("{} is not an absolute http(s) URL", options.url);
    }

    let extractor = ResolutionExtractor::new(&config.probe).map_err(fail)?;
    let runtime = spawn_extraction_runtime(extractor);

    if options.variants {
        let variants = runtime
            .extract_variants(options.url.as_str())
            .await
            .map_err(fail)?;
        print_variants(&variants, options.json)?;
    } else {
        let list = runtime.extract(options.url.as_str()).await.map_err(fail)?;
        print_resolutions(&list, options.json)?;
    }

    Ok(())
}

fn fail(error: ExtractionError) -> anyhow::Error {
    anyhow::anyhow!(error.user_message())
}

fn print_resolutions(list: &ResolutionList, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(list)?);
    } else {
        for label in &list.labels {
            println!("{label}");
        }
    }
    Ok(())
}

fn print_variants(variants: &[VariantInfo], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(variants)?);
    } else {
        for variant in variants {
            println!("{}\t{}\t{}", variant.label, variant.bandwidth, variant.uri);
        }
    }
    Ok(())
}
