//! Markdown Export
//!
//! Renders Oracle and Simplifier results as Markdown reports and writes them
//! to the export directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::analysis::oracle::format_score;
use crate::core::analysis::{HouseRuleAnalysis, TieredRulebook};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;

const UNKNOWN_GAME: &str = "Unknown Game";
const FILE_NAME_FALLBACK: &str = "game";

// ============================================================================
// Report Rendering
// ============================================================================

pub fn oracle_report(game_title: Option<&str>, analysis: &HouseRuleAnalysis) -> String {
    let mut md = format!("# Oracle Divination: {}\n\n", display_title(game_title));
    md.push_str(&format!("## Risk: {}\n", analysis.risk_score));
    md.push_str(&format!(
        "**Risk Explanation:** {}\n\n",
        analysis
            .risk_explanation
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("N/A")
    ));
    md.push_str(&format!("**Summary:** {}\n\n", analysis.summary_or_default()));
    md.push_str("### Impact Scores\n");
    for (axis, score) in analysis.axis_scores() {
        md.push_str(&format!("- {axis}: {}/10\n", format_score(score)));
    }
    md
}

pub fn simplifier_report(game_title: Option<&str>, tiers: &TieredRulebook) -> String {
    let mut md = format!("# Rule Simplification: {}\n\n", display_title(game_title));
    md.push_str(&format!("## 🌱 First Game Rules\n{}\n\n", tiers.first_game));
    md.push_str(&format!("## ⚔️ Advanced Rules\n{}\n\n", tiers.advanced));
    md.push_str(&format!("## 👑 Expert Rules\n{}\n", tiers.expert));
    md
}

pub fn oracle_file_name(game_title: Option<&str>) -> String {
    format!("oracle_results_{}.md", file_component(game_title))
}

pub fn simplifier_file_name(game_title: Option<&str>) -> String {
    format!("simplified_rules_{}.md", file_component(game_title))
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_file_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn display_title(game_title: Option<&str>) -> &str {
    game_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_GAME)
}

fn file_component(game_title: Option<&str>) -> String {
    let sanitized = game_title.map(sanitize_file_component).unwrap_or_default();
    if sanitized.is_empty() {
        FILE_NAME_FALLBACK.to_string()
    } else {
        sanitized
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Write `content` to `dir/file_name`, creating `dir` if needed.
pub async fn write_report(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    tokio::fs::write(&path, content)
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

    log::info!("Exported report to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> HouseRuleAnalysis {
        serde_json::from_str(
            r#"{
                "risk_score": "Game-Breaking",
                "risk_explanation": "Infinite resources.",
                "summary": "Breaks the economy.",
                "impact_scores": {"Balance": 1, "Complexity": 7.5, "Fun Factor": 11}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_oracle_report_layout() {
        let report = oracle_report(Some("Catan"), &analysis());
        assert_eq!(
            report,
            "# Oracle Divination: Catan\n\n\
             ## Risk: Game-Breaking\n\
             **Risk Explanation:** Infinite resources.\n\n\
             **Summary:** Breaks the economy.\n\n\
             ### Impact Scores\n\
             - Balance: 1/10\n\
             - Complexity: 7.5/10\n\
             - Fun Factor: 10/10\n\
             - Pacing: 5/10\n\
             - Clarity: 5/10\n"
        );
    }

    #[test]
    fn test_oracle_report_keeps_raw_risk_label() {
        let analysis: HouseRuleAnalysis = serde_json::from_str(r#"{"risk_score": "Mostly Safe"}"#).unwrap();
        let report = oracle_report(Some("Root"), &analysis);
        assert!(report.contains("## Risk: Mostly Safe\n"));
    }

    #[test]
    fn test_oracle_report_defaults() {
        let empty: HouseRuleAnalysis = serde_json::from_str("{}").unwrap();
        let report = oracle_report(None, &empty);
        assert!(report.starts_with("# Oracle Divination: Unknown Game\n\n## Risk: Unknown\n"));
        assert!(report.contains("**Risk Explanation:** N/A\n"));
    }

    #[test]
    fn test_simplifier_report_heading_order() {
        let tiers = TieredRulebook {
            first_game: "Roll and move.".to_string(),
            advanced: "Trade.".to_string(),
            expert: "Ports.".to_string(),
            summary: String::new(),
        };
        let report = simplifier_report(None, &tiers);
        let first = report.find("## 🌱 First Game Rules\nRoll and move.").unwrap();
        let advanced = report.find("## ⚔️ Advanced Rules\nTrade.").unwrap();
        let expert = report.find("## 👑 Expert Rules\nPorts.\n").unwrap();
        assert!(report.starts_with("# Rule Simplification: Unknown Game\n\n"));
        assert!(first < advanced && advanced < expert);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(oracle_file_name(None), "oracle_results_game.md");
        assert_eq!(oracle_file_name(Some("  ")), "oracle_results_game.md");
        assert_eq!(simplifier_file_name(Some("D&D 5e")), "simplified_rules_D&D 5e.md");
        assert_eq!(
            oracle_file_name(Some("Catan: Seafarers/Expansion")),
            "oracle_results_Catan_ Seafarers_Expansion.md"
        );
    }

    #[tokio::test]
    async fn test_write_report_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports");

        let path = write_report(&target, "oracle_results_game.md", "# Report\n")
            .await
            .unwrap();
        assert_eq!(path, target.join("oracle_results_game.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Report\n");
    }
}
