use serde::Serialize;

use crate::cli::OutputFormat;

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PruneReport {
    pub classdump: String,
    pub exclusion_root: String,
    pub classpath_roots: Vec<String>,
    pub reference_classes: usize,
    pub kept: u64,
    pub pruned: u64,
    pub duration_ms: u64,
}

impl PruneReport {
    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Text => {
                let mut out = String::new();
                out.push_str(&format!("classdump: {}\n", self.classdump));
                out.push_str(&format!("exclusion_root: {}\n", self.exclusion_root));
                for root in &self.classpath_roots {
                    out.push_str(&format!("- classpath_root: {root}\n"));
                }
                out.push_str(&format!("reference_classes: {}\n", self.reference_classes));
                out.push_str(&format!("kept: {}\n", self.kept));
                out.push_str(&format!("pruned: {}\n", self.pruned));
                out.push_str(&format!("duration_ms: {}\n", self.duration_ms));
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PruneReport {
        PruneReport {
            classdump: "/b/jacoco/classdump".to_string(),
            exclusion_root: "/b/jacoco/exclclassdump".to_string(),
            classpath_roots: vec!["/b/classes/main".to_string()],
            reference_classes: 3,
            kept: 1,
            pruned: 1,
            duration_ms: 5,
        }
    }

    #[test]
    fn json_carries_counters() {
        let json: serde_json::Value = serde_json::from_str(&sample().render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["kept"], 1);
        assert_eq!(json["pruned"], 1);
        assert_eq!(json["classpath_roots"][0], "/b/classes/main");
    }

    #[test]
    fn text_lists_one_field_per_line() {
        let text = sample().render(OutputFormat::Text).unwrap();
        assert!(text.contains("kept: 1\n"));
        assert!(text.contains("pruned: 1\n"));
        assert!(text.contains("- classpath_root: /b/classes/main\n"));
    }
}
