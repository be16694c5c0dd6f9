//! HTML report generation with a D3.js consequence chart

use crate::aggregate::{project_rollup, ImplementationPlan, IMPLEMENTATION_CHECKLIST};
use crate::model::Project;
use crate::report::{fmeca_rows, FmecaRow, Summary, NOT_AVAILABLE};
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, project: &Project) -> io::Result<()> {
    let rows = fmeca_rows(project);
    let summary = Summary::from_rows(&rows);
    let rollup = project_rollup(project);

    let chart_data = serde_json::to_string(
        &rollup
            .consequences
            .by_category
            .iter()
            .map(|(category, count)| (category.label(), *count))
            .collect::<Vec<_>>(),
    )?;

    let table_rows: String = rows.iter().map(table_row).collect();
    let plans: String = project
        .assets()
        .map(|a| plan_section(&ImplementationPlan::for_asset(a)))
        .collect();
    let checklist: String = IMPLEMENTATION_CHECKLIST
        .iter()
        .map(|item| format!("<li><label><input type=\"checkbox\"> {}</label></li>\n", escape(item)))
        .collect();

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>FMECA Report - {project_no}</title>
    <script src="https://d3js.org/d3.v7.min.js"></script>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --low: #3fb950;
            --moderate: #d29922;
            --high: #f85149;
            --accent: #58a6ff;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1600px; margin: 0 auto; padding: 2rem; }}
        .header {{
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{ font-size: 2.2rem; font-weight: 800; color: var(--accent); }}
        .subtitle {{ color: var(--dim); font-size: 1rem; }}
        .stats {{
            display: grid;
            grid-template-columns: repeat(5, 1fr);
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat, .card {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
        }}
        .stat {{ text-align: center; }}
        .stat-value {{ font-size: 2.5rem; font-weight: 700; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }}
        .stat.high .stat-value {{ color: var(--high); }}
        .card {{ margin-bottom: 2rem; }}
        .card-title {{ font-size: 1rem; font-weight: 600; margin-bottom: 1rem; color: var(--dim); }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ padding: 0.6rem 0.8rem; text-align: left; border-bottom: 1px solid var(--border); font-size: 0.85rem; }}
        th {{ font-size: 0.7rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--dim); }}
        .level {{ padding: 0.15rem 0.6rem; border-radius: 20px; font-size: 0.7rem; font-weight: 600; }}
        .level.low {{ background: rgba(63,185,80,0.15); color: var(--low); }}
        .level.moderate {{ background: rgba(210,153,34,0.15); color: var(--moderate); }}
        .level.high {{ background: rgba(248,81,73,0.15); color: var(--high); }}
        .mono {{ font-family: 'SF Mono', 'Fira Code', monospace; }}
        .dim {{ color: var(--dim); }}
        ul.checklist {{ list-style: none; }}
        ul.checklist li {{ padding: 0.25rem 0; }}
        .footer {{ margin-top: 2rem; color: var(--dim); font-size: 0.8rem; text-align: center; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">{project_no}</div>
            <div class="subtitle">{description}</div>
        </div>

        <div class="stats">
            <div class="stat"><div class="stat-value">{assets}</div><div class="stat-label">Assets</div></div>
            <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Failure Modes</div></div>
            <div class="stat"><div class="stat-value">{with_task}</div><div class="stat-label">Management Tasks</div></div>
            <div class="stat high"><div class="stat-value">{high_risk}</div><div class="stat-label">High Risk</div></div>
            <div class="stat"><div class="stat-value">${annual_cost:.0}</div><div class="stat-label">Annual Cost</div></div>
        </div>

        <div class="card">
            <div class="card-title">Consequence Breakdown ({uncategorized} not yet categorized)</div>
            <div id="consequence-chart"></div>
        </div>

        <div class="card">
            <div class="card-title">Detailed FMECA</div>
            <table>
                <thead><tr>
                    <th>ID</th><th>Asset</th><th>Component</th><th>Failure Mode</th>
                    <th>Consequence</th><th>Risk</th><th>Task</th><th>Description</th><th>Annual Cost</th>
                </tr></thead>
                <tbody>
{table_rows}                </tbody>
            </table>
        </div>

{plans}
        <div class="card">
            <div class="card-title">Implementation Checklist</div>
            <ul class="checklist">
{checklist}            </ul>
        </div>

        <div class="footer">Generated {generated}</div>
    </div>

    <script>
    const data = {chart_data};

    function drawConsequenceChart() {{
        const width = 900, barHeight = 28, margin = {{ left: 260, right: 40 }};
        const svg = d3.select('#consequence-chart').append('svg')
            .attr('width', width)
            .attr('height', Math.max(data.length, 1) * barHeight + 10);
        const x = d3.scaleLinear()
            .domain([0, d3.max(data, d => d[1]) || 1])
            .range([0, width - margin.left - margin.right]);
        const g = svg.selectAll('g').data(data).enter().append('g')
            .attr('transform', (d, i) => `translate(0,${{i * barHeight}})`);
        g.append('text').attr('x', 0).attr('y', 18).attr('fill', '#7d8590').text(d => d[0]);
        g.append('rect').attr('x', margin.left).attr('y', 4)
            .attr('height', barHeight - 8).attr('width', d => x(d[1]))
            .attr('fill', d => d[0].includes('Safety') ? '#f85149' : '#58a6ff');
        g.append('text').attr('x', d => margin.left + x(d[1]) + 6).attr('y', 18)
            .attr('fill', '#e6edf3').text(d => d[1]);
    }}

    drawConsequenceChart();
    </script>
</body>
</html>
"#,
        project_no = escape(project.project_no()),
        description = escape(&project.info.description),
        assets = project.asset_count(),
        total = summary.total,
        with_task = summary.with_task,
        high_risk = summary.high_risk,
        annual_cost = summary.annual_cost,
        uncategorized = rollup.consequences.uncategorized,
        table_rows = table_rows,
        plans = plans,
        checklist = checklist,
        generated = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
        chart_data = chart_data,
    )?;

    Ok(())
}

fn table_row(r: &FmecaRow) -> String {
    let risk = if r.risk_level == NOT_AVAILABLE {
        "<span class=\"dim\">N/A</span>".to_string()
    } else {
        format!(
            "<span class=\"level {}\">{} ({})</span>",
            r.risk_level.to_lowercase(),
            escape(&r.risk_level),
            r.risk_score
        )
    };
    format!(
        "                    <tr><td class=\"mono\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"mono\">${:.2}</td></tr>\n",
        escape(&r.failure_mode_id),
        escape(&r.asset),
        escape(&r.component),
        escape(&r.failure_mode),
        escape(&r.consequence_category),
        risk,
        escape(&r.task_type),
        escape(&r.task_description),
        r.annual_cost
    )
}

fn plan_section(plan: &ImplementationPlan) -> String {
    if plan.is_empty() {
        return String::new();
    }
    let counts: Vec<String> = plan
        .schedule_counts
        .iter()
        .map(|(t, n)| format!("{}: {}", t.code(), n))
        .collect();
    let redesigns: String = plan
        .one_off_changes
        .iter()
        .map(|r| {
            format!(
                "<li>{} - {}: {} (${:.2})</li>",
                escape(&r.component),
                escape(&r.failure_mode),
                escape(&r.task_description),
                r.cost
            )
        })
        .collect();
    format!(
        r#"        <div class="card">
            <div class="card-title">Implementation Plan: {name}</div>
            <p>Scheduled tasks: {counts}. Estimated annual maintenance cost <strong>${annual:.2}</strong>.</p>
            <p>One-off changes (${one_off:.2}):</p>
            <ul>{redesigns}</ul>
        </div>
"#,
        name = escape(&plan.asset_name),
        counts = counts.join(", "),
        annual = plan.annual_cost,
        one_off = plan.one_off_cost,
        redesigns = redesigns,
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
