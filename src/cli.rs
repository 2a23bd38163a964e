use crate::strategy::MatchStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "artwork-match")]
#[command(about = "写真・Webカメラ画像から既知の美術作品を判定するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 結果を1行1件のJSONで出力
    #[arg(long, global = true)]
    pub json: bool,

    /// カタログJSONファイル（省略時は組み込みカタログ）
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像（またはフォルダ内の画像）を判定
    Identify {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        path: PathBuf,

        /// 判定方式
        #[arg(short, long, value_enum, default_value_t = MatchStrategy::Tags)]
        strategy: MatchStrategy,
    },

    /// 画像説明文から判定（identify --strategy describe と同じ）
    Describe {
        #[arg(required = true)]
        path: PathBuf,
    },

    /// 画像を直接分類（identify --strategy classify と同じ）
    Classify {
        #[arg(required = true)]
        path: PathBuf,
    },

    /// 画像からタグを抽出して判定（identify --strategy tags と同じ）
    Tags {
        #[arg(required = true)]
        path: PathBuf,
    },

    /// 指定したタグだけで判定（API呼び出しなし）
    MatchTags {
        /// 観測タグ
        #[arg(required = true)]
        tags: Vec<String>,

        /// 一致に必要なタグ数（省略時は設定値）
        #[arg(short, long)]
        threshold: Option<usize>,
    },

    /// Webカメラから取り込んで判定
    Webcam {
        /// 判定方式
        #[arg(short, long, value_enum, default_value_t = MatchStrategy::Tags)]
        strategy: MatchStrategy,

        /// カメラ番号（省略時は設定値）
        #[arg(long)]
        camera: Option<i32>,

        /// 取り込み画像の保存先（毎回上書き）
        #[arg(long)]
        capture_path: Option<PathBuf>,
    },

    /// カタログを表示
    Catalog,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_identify_default_strategy() {
        let cli = Cli::parse_from(["artwork-match", "identify", "statue.jpg"]);
        match cli.command {
            Commands::Identify { path, strategy } => {
                assert_eq!(path, PathBuf::from("statue.jpg"));
                assert_eq!(strategy, MatchStrategy::Tags);
            }
            _ => panic!("identify expected"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "artwork-match",
            "match-tags",
            "moon",
            "blue-sky",
            "--threshold",
            "2",
            "--json",
            "--catalog",
            "my.json",
        ]);
        assert!(cli.json);
        assert_eq!(cli.catalog, Some(PathBuf::from("my.json")));
        match cli.command {
            Commands::MatchTags { tags, threshold } => {
                assert_eq!(tags, vec!["moon", "blue-sky"]);
                assert_eq!(threshold, Some(2));
            }
            _ => panic!("match-tags expected"),
        }
    }

    #[test]
    fn test_webcam_strategy() {
        let cli = Cli::parse_from(["artwork-match", "webcam", "-s", "classify", "--camera", "1"]);
        match cli.command {
            Commands::Webcam { strategy, camera, capture_path } => {
                assert_eq!(strategy, MatchStrategy::Classify);
                assert_eq!(camera, Some(1));
                assert!(capture_path.is_none());
            }
            _ => panic!("webcam expected"),
        }
    }
}
