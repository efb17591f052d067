//! Markdown press-review rendering.

use crate::models::CategoryReport;
use std::fmt::Write;

/// Render a category report as a Markdown press review: a header with the
/// article count and generation time, then one numbered section per
/// article with its metadata line and summary.
pub fn report_to_markdown(report: &CategoryReport) -> String {
    let mut md = String::new();

    writeln!(md, "# Revue de presse : {}\n", report.category).unwrap();
    writeln!(md, "Nombre d'articles : {}", report.articles.len()).unwrap();
    writeln!(md, "Générée le {}\n", report.generated_at).unwrap();

    for (i, article) in report.articles.iter().enumerate() {
        writeln!(md, "## {}. {}\n", i + 1, article.title).unwrap();
        write!(md, "**Date :** {} | **Source :** {}", article.date, article.source).unwrap();
        if !article.link.is_empty() {
            write!(md, " | **Lien :** <{}>", article.link).unwrap();
        }
        writeln!(md, "\n").unwrap();
        writeln!(md, "**Résumé :** {}\n", article.summary).unwrap();
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessedArticle;

    fn sample_report() -> CategoryReport {
        CategoryReport {
            category: "International".to_string(),
            generated_at: "20/03/2024 à 18:00".to_string(),
            articles: vec![
                ProcessedArticle {
                    title: "Premier titre".to_string(),
                    date: "20 mars 2024 à 09:00".to_string(),
                    source: "Flux A".to_string(),
                    summary: "Premier résumé.".to_string(),
                    link: "https://example.com/1".to_string(),
                },
                ProcessedArticle {
                    title: "Second titre".to_string(),
                    date: "15 mars 2024 à 09:00".to_string(),
                    source: "Flux B".to_string(),
                    summary: "Second résumé.".to_string(),
                    link: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_report_rendering() {
        let md = report_to_markdown(&sample_report());

        assert!(md.starts_with("# Revue de presse : International\n"));
        assert!(md.contains("Nombre d'articles : 2"));
        assert!(md.contains("Générée le 20/03/2024 à 18:00"));
        assert!(md.contains("## 1. Premier titre"));
        assert!(md.contains("**Date :** 20 mars 2024 à 09:00 | **Source :** Flux A | **Lien :** <https://example.com/1>"));
        assert!(md.contains("**Résumé :** Premier résumé."));
    }

    #[test]
    fn test_linkless_article_omits_link_segment() {
        let md = report_to_markdown(&sample_report());
        let second_section = md.split("## 2.").nth(1).unwrap();
        assert!(!second_section.contains("**Lien :**"));
    }

    #[test]
    fn test_empty_report_renders_header_only() {
        let report = CategoryReport {
            category: "Vide".to_string(),
            generated_at: "01/01/2024 à 00:00".to_string(),
            articles: vec![],
        };
        let md = report_to_markdown(&report);
        assert!(md.contains("Nombre d'articles : 0"));
        assert!(!md.contains("## 1."));
    }
}
