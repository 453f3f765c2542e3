use crate::advisor::{Polarity, message_for};
use crate::config::FusionConfig;
use crate::geometry::BoundingBox;
use crate::report::ImageReport;
use crate::source::SourceId;
use crate::taxonomy::CanonicalClass;
use colored::Colorize;

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

fn format_bbox(bbox: &BoundingBox) -> String {
    format!(
        "[{:.0}, {:.0}, {:.0}, {:.0}]",
        bbox.x1, bbox.y1, bbox.x2, bbox.y2
    )
}

fn format_advisory(text: &str, polarity: Polarity, color: bool) -> String {
    let line = match polarity {
        Polarity::Positive => format!("✓ {}", text),
        Polarity::Negative => format!("⚠ {}", text),
    };
    if !color {
        return line;
    }
    match polarity {
        Polarity::Positive => line.green().to_string(),
        Polarity::Negative => line.yellow().to_string(),
    }
}

/// Plain-text summary of one image report.
pub fn render_report(report: &ImageReport, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&heading("Image:", color));
    out.push(' ');
    out.push_str(&report.image);

    out.push('\n');
    out.push_str(&heading("Detections:", color));
    if report.detections.is_empty() {
        out.push_str(" none");
    }
    for (class, entries) in &report.detections {
        out.push_str(&format!("\n  {} ({})", class, entries.len()));
        for entry in entries {
            out.push_str(&format!(
                "\n    {:.2} {} {}",
                entry.confidence,
                entry.source,
                format_bbox(&entry.bbox)
            ));
        }
    }

    out.push('\n');
    out.push_str(&heading("Instructions:", color));
    for text in &report.instructions.positive {
        out.push_str("\n  ");
        out.push_str(&format_advisory(text, Polarity::Positive, color));
    }
    for text in &report.instructions.negative {
        out.push_str("\n  ");
        out.push_str(&format_advisory(text, Polarity::Negative, color));
    }

    out.push('\n');
    out.push_str(&heading("Sources:", color));
    for (source, audit) in &report.audit.sources {
        out.push_str(&format!(
            "\n  {}: {} received, {} filtered",
            source, audit.received, audit.filtered
        ));
    }

    if !report.audit.suppressed.is_empty() {
        out.push('\n');
        out.push_str(&heading("Suppressed:", color));
        for (class, count) in &report.audit.suppressed {
            out.push_str(&format!("\n  {}: {}", class, count));
        }
    }

    if let Some(aux) = &report.auxiliary {
        out.push('\n');
        out.push_str(&heading("Auxiliary:", color));
        out.push_str(&format!(" {} ({:.2})", aux.label, aux.confidence));
    }

    out
}

/// Label tables, mapping, suppress rules and advisory table of a config.
pub fn render_labels(config: &FusionConfig, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&heading("Sources:", color));
    for source in SourceId::ALL {
        out.push_str(&format!(
            "\n  {}: {}",
            source,
            config.labels.table(source).join(", ")
        ));
    }

    out.push('\n');
    out.push_str(&heading("Mapping:", color));
    for (label, class) in config.mapping.entries() {
        out.push_str(&format!("\n  {} -> {}", label, class));
    }

    out.push('\n');
    out.push_str(&heading("Suppressed:", color));
    for source in SourceId::ALL {
        let classes = config.suppress.suppressed(source);
        let listed = if classes.is_empty() {
            "none".to_string()
        } else {
            classes
                .iter()
                .map(CanonicalClass::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!("\n  {}: {}", source, listed));
    }

    out.push('\n');
    out.push_str(&heading("Advisories:", color));
    for class in CanonicalClass::DECLARED {
        if let Some(message) = message_for(class) {
            out.push_str(&format!("\n  {}: ", class));
            out.push_str(&format_advisory(message.text, message.polarity, color));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{AuxiliaryResult, ImageInput, RawDetection};
    use crate::engine::FusionEngine;

    fn raw(source: SourceId, class_index: usize, confidence: f32, bbox: [f32; 4]) -> RawDetection {
        RawDetection {
            source,
            class_index,
            confidence,
            bbox: bbox.into(),
        }
    }

    #[test]
    fn renders_fused_report() {
        let config = FusionConfig::default();
        let engine = FusionEngine::new(&config).show_auxiliary(true);
        let report = engine
            .process(&ImageInput {
                image: "frame.jpg".into(),
                detections: vec![
                    raw(SourceId::Chaitanya, 3, 0.9, [10.0, 10.0, 50.0, 50.0]),
                    raw(SourceId::Soham, 4, 0.7, [12.0, 12.0, 52.0, 52.0]),
                ],
                auxiliary: Some(AuxiliaryResult {
                    label: "talking_phone".into(),
                    confidence: 0.75,
                }),
            })
            .unwrap();

        insta::assert_snapshot!(render_report(&report, false), @r"
        Image: frame.jpg
        Detections:
          Phone Usage (1)
            0.90 chaitanya [10, 10, 50, 50]
        Instructions:
          ⚠ Please fasten your seatbelt for your safety.
          ⚠ Do not use your phone while driving. Pull over if necessary.
        Sources:
          chaitanya: 1 received, 0 filtered
          soham: 1 received, 0 filtered
        Suppressed:
          Phone Usage: 1
        Auxiliary: talking_phone (0.75)
        ");
    }

    #[test]
    fn renders_empty_report() {
        let config = FusionConfig::default();
        let report = FusionEngine::new(&config)
            .process(&ImageInput {
                image: "empty.jpg".into(),
                detections: Vec::new(),
                auxiliary: None,
            })
            .unwrap();

        let out = render_report(&report, false);
        assert!(out.contains("Detections: none"));
        assert!(!out.contains("Suppressed:"));
        assert!(!out.contains("Auxiliary:"));
    }

    #[test]
    fn renders_label_tables() {
        let out = render_labels(&FusionConfig::default(), false);
        assert!(out.contains("  chaitanya: Cigarette, Drinking, Eating, Phone, Seatbelt"));
        assert!(out.contains("  PhoneUse -> Phone Usage"));
        assert!(out.contains("  chaitanya: none"));
        assert!(out.contains("  soham: Safe Driving"));
        assert!(out.contains("  Seatbelt: ✓ Thank you for wearing your seatbelt. Stay safe!"));
    }
}
