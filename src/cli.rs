use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vehicle_annotator_common::CanvasSize;

#[derive(Parser)]
#[command(name = "vehicle-annotator")]
#[command(about = "車両写真マーキング・保存ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真を取り込み、フレーム順を表示
    Import {
        /// 写真フォルダまたはファイル
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// マーカーを描き込んで保存
    Annotate {
        /// 写真フォルダまたはファイル（省略時は入力を求める）
        inputs: Vec<PathBuf>,

        /// 保存するフレーム番号（ファイル名順で0始まり）
        #[arg(short, long, default_value = "0")]
        frame: usize,

        /// マーカー x,y[,半径[,色]]（複数指定可）
        #[arg(short, long = "mark")]
        marks: Vec<String>,

        /// マーカーJSONファイル
        #[arg(long)]
        marks_file: Option<PathBuf>,

        /// マーカー座標の基準となるキャンバスサイズ（例: 800x600）。省略時は画像と同寸法
        #[arg(short, long)]
        canvas: Option<CanvasSize>,

        /// 合成画像の書き出し先（保存処理とは別にコピーを残す）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// アップロードせずローカル保存のみ
        #[arg(long)]
        no_upload: bool,
    },

    /// 記録したポインタ操作を再生し、現在フレームを保存
    Replay {
        /// 再生スクリプト(JSON)
        #[arg(required = true)]
        script: PathBuf,

        /// 写真フォルダまたはファイル
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 再生結果を表示するだけで保存しない
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        no_upload: bool,
    },

    /// 保存済み画像の一覧
    Gallery {
        /// 画像をダウンロードするフォルダ
        #[arg(short, long)]
        download: Option<PathBuf>,
    },

    /// 既存のJPEGをアップロード
    Upload {
        #[arg(required = true)]
        file: PathBuf,

        /// 保存名（省略時は bilbillede_<時刻>.jpg）
        #[arg(short, long)]
        name: Option<String>,
    },

    /// ホストのカメラで撮影し、フレームに追加してマーキング・保存
    Camera {
        /// 追加先の写真フォルダまたはファイル
        inputs: Vec<PathBuf>,

        /// マーカー x,y[,半径[,色]]（複数指定可）
        #[arg(short, long = "mark")]
        marks: Vec<String>,

        /// マーカーJSONファイル
        #[arg(long)]
        marks_file: Option<PathBuf>,

        /// マーカー座標の基準となるキャンバスサイズ（例: 800x600）。省略時は画像と同寸法
        #[arg(short, long)]
        canvas: Option<CanvasSize>,

        /// 合成画像の書き出し先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// アップロードせずローカル保存のみ
        #[arg(long)]
        no_upload: bool,
    },

    /// ダッシュボードへ戻る
    Back,

    /// 設定
    Config {
        /// 画像ストアのURLを設定
        #[arg(long)]
        set_server_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
