use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vehicle_annotator::{annotate, cli, compositor, config, error, gallery, logging, marks, platform, replay, scanner, sync};
use cli::{Cli, Commands};
use config::Config;
use error::{AnnotatorError, Result};
use platform::{CameraOutcome, Navigation, PlatformAdapter};
use sync::{HttpImageStore, SaveStatus, SyncClient};
use vehicle_annotator_common::{AnnotationSession, CanvasSize};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::init_tracing(cli.verbose, &config.log_level)?;

    match cli.command {
        Commands::Import { inputs } => {
            println!("📷 vehicle-annotator - 取り込み\n");

            let session = annotate::open_session(&inputs, config.gesture.clone())?;
            println!("✔ {}枚の写真を取り込みました\n", session.viewer().len());

            for (index, frame) in session.viewer().frames().iter().enumerate() {
                let date = scanner::ImageInfo::from_path(Path::new(&frame.source)).date;
                println!(
                    "  [{}] {}{}",
                    index,
                    frame.name,
                    date.map(|d| format!("  ({})", d)).unwrap_or_default()
                );
            }
        }

        Commands::Annotate { inputs, frame, marks: mark_args, marks_file, canvas, output, no_upload } => {
            println!("✏️  vehicle-annotator - マーキング\n");

            let inputs = if inputs.is_empty() { prompt_for_inputs()? } else { inputs };

            // 1. 取り込み
            println!("[1/3] 写真を読み込み中...");
            let mut session = annotate::open_session(&inputs, config.gesture.clone())?;
            println!("✔ {}枚の写真を検出\n", session.viewer().len());

            let request = MarkRequest { frame, mark_args, marks_file, canvas, output, no_upload };
            mark_compose_save(&config, &mut session, request).await?;
        }

        Commands::Replay { script, inputs, dry_run, no_upload } => {
            println!("▶️  vehicle-annotator - 再生\n");

            let script = replay::ReplayScript::load(&script)?;
            let mut session = annotate::open_session(&inputs, config.gesture.clone())?;
            let outcome = replay::run(&script, &mut session)?;

            println!("✔ {}ステップを再生 (操作 {}件)", outcome.steps, outcome.intents);
            println!("  フレーム: {:?}", outcome.view.frame);
            println!("  ズーム: {:.2}", outcome.view.zoom);
            println!("  {}", session.marking_label());
            println!("  マーカー: {}個\n", outcome.markers_on_frame);

            if dry_run {
                return Ok(());
            }

            let snapshot = session.snapshot().ok_or(AnnotatorError::InputMissing)?;
            let composed = annotate::compose(
                snapshot,
                Some(script.canvas),
                compositor::Compositor::new(config.jpeg_quality),
            )
            .await?;
            save_jpeg(&config, &composed.jpeg, None, no_upload).await?;
        }

        Commands::Gallery { download } => {
            println!("🖼  vehicle-annotator - ギャラリー\n");

            let store = HttpImageStore::new(&config.server_url, Duration::from_secs(config.timeout_seconds))?;
            let entries = gallery::fetch_gallery(&store).await?;
            if entries.is_empty() {
                println!("保存済みの画像はありません");
                return Ok(());
            }

            for (index, entry) in entries.iter().enumerate() {
                println!("  [{}] {}  {}", index, entry.filename, entry.created_label);
            }
            println!("\n✔ {}件", entries.len());

            if let Some(dir) = download {
                let written = gallery::download_all(&entries, &dir);
                println!("✔ {}件をダウンロード: {}", written.len(), dir.display());
                if written.len() < entries.len() {
                    println!("⚠ {}件は書き出せませんでした", entries.len() - written.len());
                }
            }
        }

        Commands::Upload { file, name } => {
            println!("⬆️  vehicle-annotator - アップロード\n");

            if !file.is_file() {
                return Err(AnnotatorError::FileNotFound(file.display().to_string()));
            }
            let bytes = std::fs::read(&file)?;
            // 壊れた画像は送らない
            compositor::decode_image(&bytes)?;
            save_jpeg(&config, &bytes, name, false).await?;
        }

        Commands::Camera { inputs, marks: mark_args, marks_file, canvas, output, no_upload } => {
            println!("📸 vehicle-annotator - 撮影\n");

            let adapter = platform::select_adapter(&config);
            let captured = match adapter.open_camera()? {
                CameraOutcome::Captured(captured) => captured,
                CameraOutcome::Unavailable(reason) => {
                    println!("⚠ {}", reason);
                    return Ok(());
                }
            };
            println!("✔ 撮影画像: {}", captured);

            // 1. 取り込み
            println!("[1/3] 撮影画像を追加中...");
            let mut session = if inputs.is_empty() {
                AnnotationSession::new(config.gesture.clone())
            } else {
                annotate::open_session(&inputs, config.gesture.clone())?
            };
            let frame = annotate::add_captured(&mut session, &captured);
            println!("✔ フレーム{}として追加 (全{}枚)\n", frame, session.viewer().len());

            let request = MarkRequest { frame, mark_args, marks_file, canvas, output, no_upload };
            mark_compose_save(&config, &mut session, request).await?;
        }

        Commands::Back => {
            let adapter = platform::select_adapter(&config);
            match adapter.navigate_back()? {
                Navigation::Host => println!("✔ ダッシュボードに戻りました"),
                Navigation::InApp(target) => println!("→ {}", target),
            }
        }

        Commands::Config { set_server_url, show } => {
            let mut config = config;

            if let Some(url) = set_server_url {
                config.set_server_url(url)?;
                println!("✔ 画像ストアのURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  画像ストア: {}", config.server_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  保存先: {}", config.resolve_save_dir().display());
                println!(
                    "  ホストブリッジ: {}",
                    config.host_bridge.as_deref().unwrap_or("未設定")
                );
                println!("  マーカー半径: {}", config.gesture.marker_radius);
            }
        }
    }

    Ok(())
}

/// マーキングから保存までの指定
struct MarkRequest {
    frame: usize,
    mark_args: Vec<String>,
    marks_file: Option<PathBuf>,
    canvas: Option<CanvasSize>,
    output: Option<PathBuf>,
    no_upload: bool,
}

async fn mark_compose_save(config: &Config, session: &mut AnnotationSession, request: MarkRequest) -> Result<()> {
    // 2. マーカー
    let mut markers = request
        .mark_args
        .iter()
        .map(|raw| marks::parse_mark(raw, &config.gesture))
        .collect::<Result<Vec<_>>>()?;
    if let Some(path) = &request.marks_file {
        markers.extend(marks::load_marks_file(path, &config.gesture)?);
    }
    let snapshot = annotate::mark_frame(session, request.frame, markers)?;

    println!("[2/3] 合成中...");
    let composed = annotate::compose(
        snapshot,
        request.canvas,
        compositor::Compositor::new(config.jpeg_quality),
    )
    .await?;
    println!(
        "✔ {} にマーカー{}個を描き込みました\n",
        composed.frame_name, composed.marker_count
    );

    if let Some(path) = &request.output {
        std::fs::write(path, &composed.jpeg)?;
        println!("✔ 書き出し: {}", path.display());
    }

    // 3. 保存
    println!("[3/3] 保存中...");
    save_jpeg(config, &composed.jpeg, None, request.no_upload).await
}

/// 画像の入力を求める。空なら InputMissing
fn prompt_for_inputs() -> Result<Vec<PathBuf>> {
    let answer: String = dialoguer::Input::new()
        .with_prompt("写真フォルダまたはファイルのパス")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| AnnotatorError::CliExecution(e.to_string()))?;

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AnnotatorError::InputMissing);
    }
    Ok(vec![PathBuf::from(answer)])
}

async fn save_jpeg(config: &Config, jpeg: &[u8], name: Option<String>, no_upload: bool) -> Result<()> {
    let file_name = name.unwrap_or_else(sync::timestamped_file_name);
    let adapter: Arc<dyn PlatformAdapter> = Arc::from(platform::select_adapter(config));

    if no_upload {
        let data_url = vehicle_annotator_common::data_url::encode_data_url(
            vehicle_annotator_common::data_url::JPEG_MIME,
            jpeg,
        );
        let saved = adapter.save_local(&file_name, &data_url)?;
        println!("✔ {}", saved.describe());
        return Ok(());
    }

    let store = HttpImageStore::new(&config.server_url, Duration::from_secs(config.timeout_seconds))?;
    let client = SyncClient::new(adapter, Arc::new(store));
    let report = client.save(&file_name, jpeg).await?;

    if let sync::LocalOutcome::Saved(saved) = &report.local {
        println!("✔ {}", saved.describe());
    }
    match report.status() {
        SaveStatus::Complete => println!("\n✅ {}", report.user_message()),
        SaveStatus::LocalOnly | SaveStatus::RemoteOnly => println!("\n⚠ {}", report.user_message()),
        SaveStatus::Failed => {
            return Err(AnnotatorError::LocalSave(report.user_message()));
        }
    }
    Ok(())
}
