//! One-photo recognition: roster + face scan in, attendance marks and a
//! printed report out.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use rollcall_core::{report, Detection, Embedding, MatchResult, Matcher, RecognitionConfig, Roster};
use rollcall_ledger::{Ledger, MarkOutcome};

use crate::config::Config;
use crate::exchange::{PhotoScan, RosterFile, ScannedFace};

pub fn run(
    cfg: &Config,
    faces_path: &Path,
    roster_path: &Path,
    image: Option<&Path>,
    threshold_override: Option<f32>,
) -> Result<()> {
    let recognition = RecognitionConfig {
        threshold: threshold_override.unwrap_or(cfg.threshold),
        model_id: cfg.model.clone(),
        detector_id: cfg.detector.clone(),
    };

    let RosterFile { model: roster_model, entries } = read_json(roster_path)?;
    let PhotoScan { model: scan_model, width, height, faces } = read_json(faces_path)?;

    // Embeddings from different models are not comparable.
    if let (Some(roster_model), Some(scan_model)) = (roster_model.as_deref(), scan_model.as_deref())
    {
        if roster_model != scan_model {
            bail!(
                "roster embeddings come from model '{roster_model}' \
                 but the photo scan used '{scan_model}'"
            );
        }
    }
    if let Some(file_model) = roster_model.as_deref() {
        if file_model != recognition.model_id {
            tracing::warn!(
                file = file_model,
                configured = %recognition.model_id,
                "roster model differs from the configured model id"
            );
        }
    }

    let mut roster =
        Roster::from_entries(entries.into_iter().map(|entry| (entry.name, entry.embedding)))
            .with_context(|| format!("loading roster from {}", roster_path.display()))?;
    if let Some(model) = roster_model {
        roster = roster.with_model_id(model);
    }

    if roster.is_empty() {
        println!(
            "No known faces loaded. Export reference embeddings for the faces folder \
             (file name = person's name) and run again."
        );
        return Ok(());
    }
    tracing::info!(identities = roster.len(), threshold = recognition.threshold, "roster loaded");

    // Pixel bounds for box clamping; the photo itself wins over scan metadata.
    let (image_width, image_height) = match image {
        Some(path) => image::image_dimensions(path)
            .with_context(|| format!("reading dimensions of {}", path.display()))?,
        None => match (width, height) {
            (Some(width), Some(height)) => (width, height),
            _ => bail!("face scan carries no image dimensions; pass --image to read them from the photo"),
        },
    };

    let mut ledger = Ledger::open(&cfg.ledger)
        .with_context(|| format!("opening ledger {}", cfg.ledger.display()))?;
    let matcher = Matcher::new(&recognition);

    let results = process_scan(
        &matcher,
        &roster,
        faces,
        image_width,
        image_height,
        &mut ledger,
        Local::now().naive_local(),
    )?;

    for result in &results {
        let bbox = &result.detection.bbox;
        println!(
            "  [{:>4},{:>4} {:>3}x{:<3}] {}",
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height,
            report::label(result)
        );
    }

    let recognized = report::recognized_names(&results);
    if recognized.is_empty() {
        println!("No matches above threshold. You can lower the threshold if needed.");
    } else {
        println!("Recognized: {}", recognized.join(", "));
    }
    Ok(())
}

/// Match every scanned face and mark attendance for the accepted ones.
/// A face with an empty embedding is skipped; the rest still get processed.
fn process_scan(
    matcher: &Matcher,
    roster: &Roster,
    faces: Vec<ScannedFace>,
    image_width: u32,
    image_height: u32,
    ledger: &mut Ledger,
    now: NaiveDateTime,
) -> Result<Vec<MatchResult>> {
    tracing::info!(faces = faces.len(), "processing photo");

    let mut results = Vec::new();
    for (index, face) in faces.into_iter().enumerate() {
        if face.embedding.is_empty() {
            tracing::warn!(index, "skipping face with empty embedding");
            continue;
        }

        let detection = Detection {
            bbox: face.facial_area.normalize(image_width, image_height),
            embedding: Embedding::new(face.embedding),
        };
        let result = matcher
            .best_match(detection, roster)
            .with_context(|| format!("matching face {index}"))?;

        if result.accepted {
            if let Some(name) = result.identity.as_deref() {
                match ledger.mark(name, result.confidence, now)? {
                    MarkOutcome::Marked => {
                        tracing::info!(name, confidence = result.confidence, "marked present");
                    }
                    MarkOutcome::AlreadyMarked => {
                        tracing::info!(name, "already marked today");
                    }
                }
            }
        }
        results.push(result);
    }
    Ok(results)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
