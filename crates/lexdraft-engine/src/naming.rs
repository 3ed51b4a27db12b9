//! Output file naming
//!
//! Generated files share one flat directory, so the composite name
//! `<owner>_<template>_<title>[_v<version>].docx` is the only uniqueness
//! safeguard. Sanitization is strict, idempotent, and applied before every
//! write.

use crate::store::{OwnerId, TemplateId};

/// Keeps alphanumerics, spaces, hyphens and underscores; everything else is
/// dropped and surrounding whitespace trimmed. Idempotent.
pub fn sanitize_title(raw: &str) -> String {
    filter_chars(raw, false)
}

/// Batch output names may carry an extension, so dots survive as well.
pub fn sanitize_output_name(raw: &str) -> String {
    filter_chars(raw, true)
}

fn filter_chars(raw: &str, keep_dots: bool) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') || (keep_dots && *c == '.')
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Filename for a single generated document. The `_v<version>` suffix marks
/// revisions; originals (version 1, no parent) go without one.
pub fn document_filename(
    owner_id: OwnerId,
    template_id: TemplateId,
    title: &str,
    version: u32,
) -> String {
    let safe = sanitize_title(title);
    if version > 1 {
        format!("{owner_id}_{template_id}_{safe}_v{version}.docx")
    } else {
        format!("{owner_id}_{template_id}_{safe}.docx")
    }
}

/// Filename for one batch output. `name` keeps its dots, gains `.docx`
/// when missing, and is prefixed like every other generated file.
pub fn batch_filename(owner_id: OwnerId, template_id: TemplateId, name: &str) -> String {
    let mut safe = sanitize_output_name(name);
    if !safe.ends_with(".docx") {
        safe.push_str(".docx");
    }
    format!("{owner_id}_{template_id}_{safe}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn sanitize_drops_path_and_shell_characters() {
        assert_eq!(
            sanitize_title("Lease: ../../etc/passwd <v2>"),
            "Lease etcpasswd v2"
        );
        assert_eq!(sanitize_title("  Simple Title  "), "Simple Title");
        assert_eq!(sanitize_title("déjà-vu_7"), "déjà-vu_7");
    }

    #[test]
    fn output_names_keep_dots_titles_do_not() {
        assert_eq!(sanitize_title("report.v2.docx"), "reportv2docx");
        assert_eq!(sanitize_output_name("report.v2.docx"), "report.v2.docx");
    }

    #[test]
    fn version_one_has_no_suffix() {
        assert_eq!(document_filename(7, 3, "Engagement Letter", 1), "7_3_Engagement Letter.docx");
        assert_eq!(
            document_filename(7, 3, "Engagement Letter", 2),
            "7_3_Engagement Letter_v2.docx"
        );
    }

    #[test]
    fn batch_names_gain_the_extension_once() {
        assert_eq!(batch_filename(1, 2, "row output"), "1_2_row output.docx");
        assert_eq!(batch_filename(1, 2, "custom.docx"), "1_2_custom.docx");
        // Case-sensitive: an upper-case extension is not recognized.
        assert_eq!(batch_filename(1, 2, "LOUD.DOCX"), "1_2_LOUD.DOCX.docx");
    }

    proptest! {
        #[test]
        fn sanitize_title_is_idempotent(raw in ".*") {
            let once = sanitize_title(&raw);
            prop_assert_eq!(sanitize_title(&once), once);
        }

        #[test]
        fn sanitize_output_name_is_idempotent(raw in ".*") {
            let once = sanitize_output_name(&raw);
            prop_assert_eq!(sanitize_output_name(&once), once);
        }

        #[test]
        fn sanitized_titles_contain_only_allowed_characters(raw in ".*") {
            let safe = sanitize_title(&raw);
            prop_assert!(safe
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_')));
        }

        #[test]
        fn batch_filenames_always_end_in_docx(
            owner in 1u64..1000,
            template in 1u64..1000,
            name in ".*",
        ) {
            let filename = batch_filename(owner, template, &name);
            let prefix = format!("{owner}_{template}_");
            prop_assert!(filename.ends_with(".docx"));
            prop_assert!(filename.starts_with(&prefix));
        }
    }
}
