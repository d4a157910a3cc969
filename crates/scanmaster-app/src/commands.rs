// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers. Image commands work on files directly; library commands
// load the state, change it, and save it back.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use scanmaster_assist::{
    OfflineAssistant, RetryConfig, Summarizer, TextRecognizer, Translator, recognize_document,
    translate_text,
};
use scanmaster_core::error::{Result, ScanmasterError};
use scanmaster_core::types::{DocumentId, EncodedImage, FilterKind, LanguageCode, MeteredFeature};
use scanmaster_document::scan::{capture_page, rotate_clockwise, set_filter};
use scanmaster_document::{PdfWriter, Quality, pipeline};
use tracing::{info, warn};

use crate::{Commands, PageTarget};
use crate::services::app_services::AppServices;
use crate::state::AppState;

pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Filter {
            input,
            output,
            filter,
        } => filter_file(&input, &output, filter),
        Commands::Rotate {
            input,
            output,
            degrees,
        } => transform_file(&input, &output, |image| pipeline::rotate(image, degrees)),
        Commands::Watermark {
            input,
            output,
            text,
            target,
        } => transform_target(input, output, target, |image| {
            pipeline::add_watermark(image, &text)
        }),
        Commands::Sign {
            input,
            output,
            signature,
            target,
        } => {
            let signature = read_image(&signature)?;
            transform_target(input, output, target, |image| {
                pipeline::overlay_signature(image, &signature)
            })
        }
        Commands::Compress {
            input,
            output,
            quality,
        } => {
            let services = AppServices::init().unwrap_or_else(|err| {
                warn!(%err, "data directory unavailable, using default settings");
                AppServices::in_memory()
            });
            let quality = quality.unwrap_or(services.config().compress_quality);
            transform_file(&input, &output, |image| {
                pipeline::compress(image, Some(quality))
            })
        }
        Commands::Export {
            output,
            images,
            document,
        } => {
            let services = AppServices::init()?;
            let state = services.load_state(today())?;
            export(&state, &output, &images, document)
        }
        Commands::Scan {
            images,
            filter,
            turns,
        } => {
            let services = AppServices::init()?;
            let mut state = services.load_state(today())?;
            let id = scan(&mut state, &images, filter, turns)?;
            services.save_state(&state)?;
            println!("{id}");
            Ok(())
        }
        Commands::List => {
            let services = AppServices::init()?;
            let state = services.load_state(today())?;
            list(&state);
            Ok(())
        }
        Commands::Delete { id } => {
            let services = AppServices::init()?;
            let mut state = services.load_state(today())?;
            let removed = state.delete_document(id)?;
            services.save_state(&state)?;
            println!("Deleted \"{}\"", removed.title);
            Ok(())
        }
        Commands::Ocr { id } => {
            let services = AppServices::init()?;
            let mut state = services.load_state(today())?;
            let result = ocr(&mut state, id, &OfflineAssistant).await;
            // Usage counted before a later failure must still be kept.
            services.save_state(&state)?;
            result?;

            let document = state.document(id)?;
            println!("{}", document.title);
            if !document.tags.is_empty() {
                println!("Tags: {}", document.tags.join(", "));
            }
            if let Some(summary) = &document.summary {
                println!("{summary}");
            }
            println!();
            println!("{}", document.extracted_text.as_deref().unwrap_or_default());
            Ok(())
        }
        Commands::Translate { id, language } => {
            let services = AppServices::init()?;
            let mut state = services.load_state(today())?;
            let language = language.unwrap_or(state.config.target_language);
            let result = translate(&mut state, id, language, &OfflineAssistant).await;
            services.save_state(&state)?;
            println!("{}", result?);
            Ok(())
        }
        Commands::Text { id, set } => {
            let services = AppServices::init()?;
            let mut state = services.load_state(today())?;
            if let Some(text) = set {
                set_text(&mut state, id, text)?;
                services.save_state(&state)?;
            }
            println!(
                "{}",
                state.document(id)?.extracted_text.as_deref().unwrap_or_default()
            );
            Ok(())
        }
        Commands::Config { language, quality } => {
            let mut services = AppServices::init()?;
            let mut config = services.config().clone();
            if let Some(language) = language {
                config.target_language = language;
            }
            if let Some(quality) = quality {
                Quality::new(quality)?;
                config.compress_quality = quality;
            }
            if language.is_some() || quality.is_some() {
                services.update_config(config)?;
            }
            println!("{}", serde_json::to_string_pretty(services.config())?);
            Ok(())
        }
        Commands::Plan { set } => {
            let services = AppServices::init()?;
            let mut state = services.load_state(today())?;
            if let Some(plan) = set {
                state.plan = plan;
                services.save_state(&state)?;
                info!(%plan, "Plan changed");
            }
            print_plan(&state);
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(ScanmasterError::InvalidParameter(
                    "reset deletes every saved document; pass --yes to confirm".into(),
                ));
            }
            let services = AppServices::init()?;
            services.reset(today())?;
            println!("All local data deleted.");
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// -- Files --------------------------------------------------------------------

fn read_image(path: &Path) -> Result<EncodedImage> {
    Ok(EncodedImage::sniffed(std::fs::read(path)?))
}

fn transform_file(
    input: &Path,
    output: &Path,
    transform: impl FnOnce(&EncodedImage) -> Result<EncodedImage>,
) -> Result<()> {
    let image = read_image(input)?;
    let result = transform(&image)?;
    std::fs::write(output, result.bytes())?;
    info!(output = %output.display(), bytes = result.len(), "Image written");
    Ok(())
}

/// Run `transform` on a saved page when a document is named, otherwise
/// from `input` to `output`.
fn transform_target(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    target: PageTarget,
    transform: impl FnOnce(&EncodedImage) -> Result<EncodedImage>,
) -> Result<()> {
    if let Some(id) = target.document {
        let services = AppServices::init()?;
        let mut state = services.load_state(today())?;
        edit_page(&mut state, id, target.page, transform)?;
        services.save_state(&state)?;
        println!("Updated page {} of {id}", target.page);
        return Ok(());
    }
    match (input, output) {
        (Some(input), Some(output)) => transform_file(&input, &output, transform),
        _ => Err(ScanmasterError::InvalidParameter(
            "give an input and an output image, or --document".into(),
        )),
    }
}

fn filter_file(input: &Path, output: &Path, filter: FilterKind) -> Result<()> {
    transform_file(input, output, |image| pipeline::apply_filter(image, filter))
}

// -- Library ------------------------------------------------------------------

/// Capture `images` as the pages of a new document and return its id.
fn scan(
    state: &mut AppState,
    images: &[impl AsRef<Path>],
    filter: FilterKind,
    turns: u8,
) -> Result<DocumentId> {
    for path in images {
        let mut page = capture_page(read_image(path.as_ref())?)?;
        if filter != FilterKind::Original {
            set_filter(&mut page, filter)?;
        }
        for _ in 0..turns % 4 {
            rotate_clockwise(&mut page)?;
        }
        state.current_scan.push(page);
    }
    state.finish_current_scan()
}

/// Replace the processed image of page `index` with `edit` applied to it.
/// A later filter change or rotation re-derives the page from its original.
fn edit_page(
    state: &mut AppState,
    id: DocumentId,
    index: usize,
    edit: impl FnOnce(&EncodedImage) -> Result<EncodedImage>,
) -> Result<()> {
    let mut document = state.document(id)?.clone();
    let page = document
        .pages
        .get_mut(index)
        .ok_or_else(|| ScanmasterError::NotFound(format!("page {index} of document {id}")))?;
    page.processed = edit(&page.processed)?;
    info!(document = %id, page = index, "Page edited");
    state.update_document(document)
}

/// Replace the extracted text. An empty value clears it, so OCR can run
/// again.
fn set_text(state: &mut AppState, id: DocumentId, text: String) -> Result<()> {
    let document = state.document_mut(id)?;
    document.extracted_text = (!text.trim().is_empty()).then_some(text);
    Ok(())
}

/// Write a PDF of a saved document, or of loose images. Free-plan exports
/// carry the attribution caption.
fn export(
    state: &AppState,
    output: &Path,
    images: &[impl AsRef<Path>],
    document: Option<DocumentId>,
) -> Result<()> {
    let mut writer = PdfWriter::new(state.config.paper_size, state.config.page_layout);
    let pages = match document {
        Some(id) => {
            let document = state.document(id)?;
            writer.set_title(document.title.clone());
            document.pages.iter().map(|p| p.processed.clone()).collect()
        }
        None => images
            .iter()
            .map(|p| read_image(p.as_ref()))
            .collect::<Result<Vec<_>>>()?,
    };
    writer.write_to_file(&pages, state.export_footer(), output)
}

fn list(state: &AppState) {
    if state.documents.is_empty() {
        println!("No documents yet. Use `scanmaster scan` to add one.");
        return;
    }
    for doc in &state.documents {
        let tags = if doc.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", doc.tags.join(", "))
        };
        println!(
            "{}  {}  {} page(s)  {} KB{}",
            doc.id,
            doc.title,
            doc.pages.len(),
            doc.size_bytes.div_ceil(1024),
            tags
        );
    }
}

fn print_plan(state: &AppState) {
    println!("Plan: {}", state.plan);
    let gate = state.usage_gate();
    for feature in [MeteredFeature::Ocr, MeteredFeature::Translation] {
        match gate.remaining(&state.stats, feature) {
            Some(left) => println!("{feature}: {left} left today"),
            None => println!("{feature}: unlimited"),
        }
    }
}

async fn ocr<A>(state: &mut AppState, id: DocumentId, assistant: &A) -> Result<()>
where
    A: TextRecognizer + Summarizer,
{
    let gate = state.usage_gate();
    let retry = RetryConfig::from(state.config.retry);
    let mut document = state.document(id)?.clone();
    recognize_document(assistant, &mut document, &gate, &mut state.stats, &retry).await?;
    state.update_document(document)
}

async fn translate<A>(
    state: &mut AppState,
    id: DocumentId,
    language: LanguageCode,
    assistant: &A,
) -> Result<String>
where
    A: Translator,
{
    let gate = state.usage_gate();
    let retry = RetryConfig::from(state.config.retry);
    let text = state
        .document(id)?
        .extracted_text
        .clone()
        .ok_or_else(|| {
            ScanmasterError::InvalidParameter("run `scanmaster ocr` on this document first".into())
        })?;
    translate_text(assistant, &text, language, &gate, &mut state.stats, &retry).await
}
