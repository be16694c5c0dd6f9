//! CSV export of the detailed FMECA table

use crate::model::Project;
use crate::report::{fmeca_rows, FmecaRow};
use std::io::{self, Write};

const HEADER: [&str; 19] = [
    "Asset",
    "Function",
    "Functional Failure ID",
    "Functional Failure",
    "Failure Mode ID",
    "Component",
    "Failure Mode",
    "Cause",
    "Safety Impact",
    "Operational Impact",
    "Downtime (hrs)",
    "Consequence Category",
    "Risk Score",
    "Risk Level",
    "Task Type",
    "Task Description",
    "Annual Cost ($)",
    "Failure Cost ($)",
    "Residual Risk Level",
];

pub fn write<W: Write>(writer: &mut W, project: &Project) -> io::Result<()> {
    write_rows(writer, &fmeca_rows(project))
}

pub fn write_rows<W: Write>(writer: &mut W, rows: &[FmecaRow]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER.join(","))?;

    for r in rows {
        let fields = [
            escape(&r.asset),
            escape(&r.function),
            escape(&r.functional_failure_id),
            escape(&r.functional_failure),
            escape(&r.failure_mode_id),
            escape(&r.component),
            escape(&r.failure_mode),
            escape(&r.cause),
            escape(&r.safety_impact),
            escape(&r.operational_impact),
            format!("{}", r.downtime_hrs),
            escape(&r.consequence_category),
            r.risk_score.to_string(),
            escape(&r.risk_level),
            escape(&r.task_type),
            escape(&r.task_description),
            format!("{:.2}", r.annual_cost),
            format!("{:.2}", r.failure_cost),
            escape(&r.residual_risk_level),
        ];
        writeln!(writer, "{}", fields.join(","))?;
    }

    Ok(())
}

/// Quote a field if it contains a delimiter, quote or line break.
fn escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_project;

    #[test]
    fn test_escape() {
        assert_eq!(escape("Bearing"), "Bearing");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_one_line_per_failure_mode() {
        let mut out = Vec::new();
        write(&mut out, &sample_project()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split(',').count(), HEADER.len());
        assert!(lines[1].contains("FM-FF-1.1-1"));
        assert!(lines[1].contains(",160.00,"));
        assert!(lines[2].contains("\"Seal leaks, \"\"weeping\"\" at gland\""));
    }
}
