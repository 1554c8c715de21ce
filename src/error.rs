use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("画像が選択されていません。少なくとも1枚の画像を選択してください")]
    InputMissing,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("画像デコードエラー: {0}")]
    Decode(String),

    #[error("画像エンコードエラー: {0}")]
    Encode(String),

    #[error("マーカー指定が不正: {0}")]
    InvalidMarker(String),

    #[error("ローカル保存エラー: {0}")]
    LocalSave(String),

    #[error("アップロードエラー: {0}")]
    RemoteUpload(String),

    #[error("画像一覧の取得エラー: {0}")]
    RemoteFetch(String),

    #[error("サーバー応答のパースに失敗: {0}")]
    RemoteParse(String),

    #[error("ホストブリッジエラー: {0}")]
    HostBridge(String),

    #[error("保存処理が実行中です。完了するまでお待ちください")]
    SaveInProgress,

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] vehicle_annotator_common::Error),
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
