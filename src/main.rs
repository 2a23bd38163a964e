use artwork_match::{capture, catalog, cli, config, error, matcher, normalizer, output, scanner, service};
use artwork_match::strategy::MatchStrategy;
use artwork_match_common::{match_tags, Catalog};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::{ArtworkMatchError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use matcher::{Identification, Matcher, MatcherSettings};
use normalizer::NormalizeOptions;
use service::{OpenAiClient, VisionService};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("✖ {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "artwork_match=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 出力オプション
#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
    verbose: bool,
}

async fn run(cli: Cli) -> Result<()> {
    // .env は任意
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(".env を読み込みません: {}", e);
    }

    let mode = OutputMode {
        json: cli.json,
        verbose: cli.verbose,
    };
    // 設定ファイルはサービス・カメラを使うコマンドでだけ読む
    match cli.command {
        Commands::Identify { path, strategy } => {
            let catalog = Arc::new(catalog::load_catalog(cli.catalog.as_deref())?);
            identify_path(&path, strategy, &Config::load()?, catalog, mode).await?;
        }

        Commands::Describe { path } => {
            let catalog = Arc::new(catalog::load_catalog(cli.catalog.as_deref())?);
            identify_path(&path, MatchStrategy::Describe, &Config::load()?, catalog, mode).await?;
        }

        Commands::Classify { path } => {
            let catalog = Arc::new(catalog::load_catalog(cli.catalog.as_deref())?);
            identify_path(&path, MatchStrategy::Classify, &Config::load()?, catalog, mode).await?;
        }

        Commands::Tags { path } => {
            let catalog = Arc::new(catalog::load_catalog(cli.catalog.as_deref())?);
            identify_path(&path, MatchStrategy::Tags, &Config::load()?, catalog, mode).await?;
        }

        Commands::MatchTags { tags, threshold } => {
            let catalog = catalog::load_catalog(cli.catalog.as_deref())?;
            let threshold = config::resolve_tag_threshold(threshold, Config::load);
            let result = match_tags(&tags, &catalog, threshold);
            println!("{}", output::format_tag_match(&result, mode.json));
        }

        Commands::Webcam { strategy, camera, capture_path } => {
            let config = Config::load()?;
            let catalog = Arc::new(catalog::load_catalog(cli.catalog.as_deref())?);
            let camera = camera.unwrap_or(config.camera_index);
            let capture_path = capture_path.unwrap_or_else(capture::default_capture_path);
            run_webcam(strategy, camera, capture_path, &config, catalog, mode).await?;
        }

        Commands::Catalog => {
            let catalog = catalog::load_catalog(cli.catalog.as_deref())?;
            println!("{}", output::format_catalog(&catalog, mode.json));
        }

        Commands::Config { set_api_key, show } => {
            let mut config = Config::load()?;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定: {}", Config::config_path()?.display());
                println!("  モデル: {}", config.model);
                println!("  APIエンドポイント: {}", config.base_url);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  タグ一致閾値: {}", config.tag_threshold);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  カメラ番号: {}", config.camera_index);
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}

async fn identify_path(
    path: &Path,
    strategy: MatchStrategy,
    config: &Config,
    catalog: Arc<Catalog>,
    mode: OutputMode,
) -> Result<()> {
    // 入力とAPIキーは最初に確認する
    let images = scanner::collect_inputs(path)?;
    let client = OpenAiClient::from_config(config)?;
    let matcher = Matcher::new(client, catalog, MatcherSettings::from(config));
    let options = NormalizeOptions::from(config);

    if !mode.json {
        println!("🖼  artwork-match - 作品判定 ({})\n", strategy);
    }

    let total = images.len();
    let mut failed = 0;

    for (i, image) in images.iter().enumerate() {
        if !mode.json {
            println!("[{}/{}] {}", i + 1, total, image.file_name);
        }

        match identify_one(&matcher, &image.path, strategy, options, mode).await {
            Ok(id) => println!("{}", output::format_identification(&image.file_name, &id, mode.json, mode.verbose)),
            Err(e) if total == 1 => return Err(e),
            Err(e) => {
                failed += 1;
                println!("{}", output::format_failure(&image.file_name, &e, mode.json));
            }
        }
    }

    if failed > 0 {
        return Err(ArtworkMatchError::PartialFailure { failed, total });
    }
    Ok(())
}

async fn identify_one<S: VisionService>(
    matcher: &Matcher<S>,
    path: &Path,
    strategy: MatchStrategy,
    options: NormalizeOptions,
    mode: OutputMode,
) -> Result<Identification> {
    let image = normalizer::normalize_path(path, options)?;

    let spinner = (!mode.json).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("  {spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("API応答待ち...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });

    let result = matcher.identify(image, strategy).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

#[cfg(feature = "camera")]
async fn run_webcam(
    strategy: MatchStrategy,
    camera: i32,
    capture_path: PathBuf,
    config: &Config,
    catalog: Arc<Catalog>,
    mode: OutputMode,
) -> Result<()> {
    let client = OpenAiClient::from_config(config)?;
    let matcher = Arc::new(Matcher::new(client, catalog, MatcherSettings::from(config)));
    let device = capture::OpenCvCamera::open(camera)?;

    if !mode.json {
        println!("📷 artwork-match - Webカメラ ({})", strategy);
        println!("  [c] 取り込み  [q] 終了\n");
    }

    let summary = capture::CaptureLoop::new(device, matcher, strategy)
        .capture_path(capture_path)
        .normalize_options(NormalizeOptions::from(config))
        .run(|report| println!("{}", output::format_capture_report(&report, mode.json, mode.verbose)))
        .await?;

    if !mode.json {
        println!(
            "\n取り込み {}件 / 判定 {}件 / 中断 {}件",
            summary.captures, summary.completed, summary.cancelled
        );
    }
    Ok(())
}

#[cfg(not(feature = "camera"))]
async fn run_webcam(
    _strategy: MatchStrategy,
    _camera: i32,
    _capture_path: PathBuf,
    _config: &Config,
    _catalog: Arc<Catalog>,
    _mode: OutputMode,
) -> Result<()> {
    Err(ArtworkMatchError::Camera(
        "Webカメラ入力は camera フィーチャー付きでビルドしてください (cargo build --features camera)".into(),
    ))
}
