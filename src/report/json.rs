//! JSON report: summary, rollup, implementation plans and FMECA rows

use crate::aggregate::{project_rollup, ImplementationPlan, ProjectRollup};
use crate::model::Project;
use crate::report::{fmeca_rows, FmecaRow, Summary};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct Report<'a> {
    project_no: &'a str,
    description: &'a str,
    generated: String,
    summary: Summary,
    rollup: ProjectRollup,
    implementation: Vec<ImplementationPlan>,
    rows: Vec<FmecaRow>,
}

pub fn write<W: Write>(writer: &mut W, project: &Project) -> io::Result<()> {
    let rows = fmeca_rows(project);
    let report = Report {
        project_no: project.project_no(),
        description: &project.info.description,
        generated: chrono::Utc::now().to_rfc3339(),
        summary: Summary::from_rows(&rows),
        rollup: project_rollup(project),
        implementation: project.assets().map(ImplementationPlan::for_asset).collect(),
        rows,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_project;

    #[test]
    fn test_report_structure() {
        let mut out = Vec::new();
        write(&mut out, &sample_project()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["project_no"], "P-100");
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["rows"].as_array().unwrap().len(), 2);
        assert_eq!(value["rollup"]["management_tasks"], 1);
        assert_eq!(
            value["implementation"][0]["checklist"].as_array().unwrap().len(),
            12
        );
        assert_eq!(
            value["rollup"]["task_counts"]["FTM - Fixed Time Maintenance"],
            1
        );
    }
}
