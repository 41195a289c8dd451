//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::session_interactor::{NoticeLevel, SessionEvent, SessionInteractor};
use crate::cli::args::{
    parse_key_script, parse_segment_spec, DeleteArgs, KeyStep, OutputFormat, RunArgs, UploadArgs,
    VideosArgs,
};
use crate::domain::errors::DomainError;
use crate::domain::model::{OutputDescriptor, UploadFile, VideoDescriptor};
use crate::domain::rules::health_warning;
use crate::error::StudioError;
use crate::utils::time::{format_bytes, format_time};

/// Attach the user-facing message to a domain error
fn surfaced(error: DomainError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

/// Print a value in the requested format; `text` renders the plain form
fn print_value<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| {
            StudioError::Render {
                message: e.to_string(),
            }
        })?,
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| StudioError::Render {
            message: e.to_string(),
        })?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Whether error notices are printed or left to the failing command's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorNotices {
    Print,
    Skip,
}

/// Stderr line for a notice, if it should be shown
fn notice_line(event: &SessionEvent, errors: ErrorNotices) -> Option<String> {
    match event {
        SessionEvent::Notice {
            level: NoticeLevel::Error,
            message,
        } => match errors {
            ErrorNotices::Print => Some(format!("[error] {}", message)),
            ErrorNotices::Skip => {
                debug!("Error notice: {}", message);
                None
            }
        },
        SessionEvent::Notice {
            level: NoticeLevel::Warning,
            message,
        } => Some(format!("[warning] {}", message)),
        SessionEvent::Notice {
            level: NoticeLevel::Info,
            message,
        } => Some(format!("[info] {}", message)),
        _ => None,
    }
}

/// Print pending notices
fn render_events(events: &mut broadcast::Receiver<SessionEvent>, errors: ErrorNotices) {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::PhaseChanged { from, to } = &event {
            debug!(%from, %to, "Phase changed");
        }
        if let Some(line) = notice_line(&event, errors) {
            eprintln!("{}", line);
        }
    }
}

fn video_text(video: &VideoDescriptor) -> String {
    let size = video
        .size
        .map(format_bytes)
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}\t{}\t{}\t{}",
        video.filename,
        format_time(video.duration),
        size,
        video.url
    )
}

fn output_text(output: &OutputDescriptor) -> String {
    format!(
        "Video processed successfully!\nFile: {}\nSize: {}\nURL: {}",
        output.output_filename,
        format_bytes(output.output_size),
        output.output_url
    )
}

async fn read_upload(path: &Path, media_type: Option<String>) -> Result<UploadFile> {
    if !path.exists() {
        return Err(StudioError::InputFileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .with_context(|| format!("Not a file: {}", path.display()))?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(UploadFile::new(filename, media_type, data))
}

/// Execute the health command
pub async fn health(container: &DefaultAppContainer) -> Result<()> {
    let report = container.backend().health().await.map_err(surfaced)?;

    println!(
        "Backend: {}",
        report.status.as_deref().unwrap_or("unknown")
    );
    println!(
        "FFmpeg: {}",
        if report.ffmpeg_available {
            "available"
        } else {
            "missing"
        }
    );
    if let Some(message) = health_warning(&report) {
        eprintln!("[warning] {}", message);
    }
    Ok(())
}

/// Execute the videos command
pub async fn videos(container: &DefaultAppContainer, args: VideosArgs) -> Result<()> {
    let session = container.session_interactor();
    let videos = session.list_videos().await.map_err(surfaced)?;
    info!("Backend holds {} video(s)", videos.len());

    print_value(&videos, args.format, |videos| {
        if videos.is_empty() {
            return "No videos uploaded".to_string();
        }
        videos.iter().map(video_text).collect::<Vec<_>>().join("\n")
    })
}

/// Execute the upload command
pub async fn upload(container: &DefaultAppContainer, args: UploadArgs) -> Result<()> {
    let file = read_upload(&args.input, args.media_type).await?;

    let mut session = container.session_interactor();
    let mut events = session.subscribe();
    let result = session.upload(file).await;
    render_events(&mut events, ErrorNotices::Skip);

    let video = result.map_err(surfaced)?;
    print_value(&video, args.format, video_text)
}

/// Execute the run command
///
/// Drives a whole editing session: upload, segments from arguments and the
/// key script, processing and the optional download.
pub async fn run(container: &DefaultAppContainer, args: RunArgs) -> Result<()> {
    let segments = args
        .segments
        .iter()
        .map(|spec| parse_segment_spec(spec))
        .collect::<Result<Vec<_>, _>>()?;
    let script = match args.keys.as_deref() {
        Some(script) => parse_key_script(script)?,
        None => Vec::new(),
    };
    let file = read_upload(&args.input, args.media_type).await?;

    let mut session = container.session_interactor();
    let mut events = session.subscribe();
    let probe = session.spawn_health_probe();

    let uploaded = session.upload(file).await;
    if let Ok(report) = probe.await {
        debug!(?report, "Health probe finished");
    }
    render_events(&mut events, ErrorNotices::Skip);
    let video = uploaded.map_err(surfaced)?;

    // The headless player has no decoder; metadata is the backend's duration
    let player = container.player();
    player.finish_loading(video.duration);

    for (start, end) in segments {
        let added = session.add_segment(start, end);
        render_events(&mut events, ErrorNotices::Skip);
        added.map_err(surfaced)?;
    }

    run_key_script(&mut session, container, &script, &mut events);

    for row in session.segments().rows() {
        println!("{}", row);
    }
    println!(
        "Total: {} segment(s), {}",
        session.segments().len(),
        format_time(session.segments().total_duration())
    );

    let processed = session.process().await;
    render_events(&mut events, ErrorNotices::Skip);
    let output = processed.map_err(surfaced)?;
    print_value(&output, args.format, output_text)?;

    if args.download {
        let saved = session.download().await;
        render_events(&mut events, ErrorNotices::Skip);
        match saved.map_err(surfaced)? {
            Some(saved) => println!("Saved: {} ({})", saved.location, format_bytes(saved.bytes)),
            None => warn!("Nothing to download"),
        }
    }

    session.dispose();
    Ok(())
}

fn run_key_script(
    session: &mut SessionInteractor,
    container: &DefaultAppContainer,
    script: &[KeyStep],
    events: &mut broadcast::Receiver<SessionEvent>,
) {
    let player = container.player();
    for step in script {
        match step {
            KeyStep::Wait(seconds) => player.advance(*seconds),
            KeyStep::Press { event, context } => match session.handle_key(event, *context) {
                Some(outcome) => debug!(key = %event.code, ?outcome, "Key handled"),
                None => debug!(key = %event.code, "Key ignored"),
            },
        }
        // key presses have no failing result to carry their errors
        render_events(events, ErrorNotices::Print);
    }
}

/// Execute the delete-video command
pub async fn delete_video(container: &DefaultAppContainer, args: DeleteArgs) -> Result<()> {
    let session = container.session_interactor();
    let report = session
        .delete_video(&args.filename)
        .await
        .map_err(surfaced)?;
    println!(
        "{}",
        report
            .message
            .unwrap_or_else(|| format!("Deleted {}", args.filename))
    );
    Ok(())
}

/// Execute the delete-output command
pub async fn delete_output(container: &DefaultAppContainer, args: DeleteArgs) -> Result<()> {
    let session = container.session_interactor();
    let report = session
        .delete_output(&args.filename)
        .await
        .map_err(surfaced)?;
    println!(
        "{}",
        report
            .message
            .unwrap_or_else(|| format!("Deleted {}", args.filename))
    );
    Ok(())
}
