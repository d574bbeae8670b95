//! HTML report: one sortable table row per ranked result.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::engine::MetricResult;

pub const DEFAULT_HIGHLIGHT_TRADES: i64 = 1000;
pub const DEFAULT_REFRESH_SECS: u32 = 60;

const QUOTE_URL: &str = "https://finance.yahoo.com/quote/";
const ROW_CAPACITY: usize = 512;

/// Everything the page shows besides the rows.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    /// Eastern wall-clock time of the run, as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: &'a str,
    pub timezone: &'a str,
    /// Rows with more minute trades than this are highlighted.
    pub highlight_trades: i64,
    /// Browser auto-refresh interval.
    pub refresh_secs: u32,
}

#[derive(Debug, Error)]
#[error("failed to write report {}: {source}", path.display())]
pub struct ReportError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Renders the full page. Rows appear in the order given.
pub fn render_html(results: &[MetricResult], ctx: &ReportContext<'_>) -> String {
    let mut rows = String::with_capacity(ROW_CAPACITY * results.len());
    for r in results {
        push_row(&mut rows, r, ctx.highlight_trades);
    }

    let mut html = String::with_capacity(rows.len() + HEAD_STYLE.len() + 2048);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n    \
         <meta http-equiv=\"refresh\" content=\"{refresh}\">\n    \
         <title>Stock Metrics {ts} {tz}</title>\n",
        refresh = ctx.refresh_secs,
        ts = ctx.timestamp,
        tz = ctx.timezone,
    );
    html.push_str(HEAD_STYLE);
    let _ = write!(
        html,
        "</head>\n<body>\n    <div class=\"container\">\n        \
         <h1>Stock Metrics for {ts} {tz}</h1>\n        \
         <table id=\"stockTable\" class=\"display\">\n            <thead>\n                <tr>\n",
        ts = ctx.timestamp,
        tz = ctx.timezone,
    );
    for heading in COLUMNS {
        let _ = writeln!(html, "                    <th>{heading}</th>");
    }
    html.push_str("                </tr>\n            </thead>\n            <tbody>\n");
    html.push_str(&rows);
    html.push_str("            </tbody>\n        </table>\n    </div>\n");
    html.push_str(TABLE_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

fn push_row(out: &mut String, r: &MetricResult, highlight_trades: i64) {
    let class = if r.trades > highlight_trades {
        "high-trades"
    } else {
        ""
    };
    // Symbols are restricted to [A-Z0-9./-], so no escaping is needed.
    let _ = writeln!(
        out,
        "<tr class=\"{class}\">\
         <td><a href=\"{QUOTE_URL}{sym}\" target=\"_blank\">{sym}</a></td>\
         <td>{:.3}</td><td>{:.3}</td>\
         <td data-order=\"{pct:.1}\">{pct:.1}%</td>\
         <td>{:.1}</td><td>{:.1}</td>\
         <td>{}</td><td>{}</td>\
         <td>{:.1}</td><td>{}</td><td>{}</td></tr>",
        r.price,
        r.day_close,
        r.gradient_full,
        r.gradient_recent,
        r.volume,
        r.trades,
        r.gradient_change,
        r.volume_change,
        r.trades_change,
        sym = r.symbol,
        pct = r.percent,
    );
}

/// Overwrites `path` with the rendered page.
pub fn write_report(path: impl AsRef<Path>, html: &str) -> Result<(), ReportError> {
    let path = path.as_ref();
    std::fs::write(path, html).map_err(|source| ReportError {
        path: path.to_path_buf(),
        source,
    })
}

const COLUMNS: [&str; 11] = [
    "Symbol",
    "Price",
    "Close",
    "% Change",
    "Gradient/2",
    "Recent",
    "Volume",
    "Trades",
    "∆Gradient",
    "∆Volume",
    "∆Trades",
];

const HEAD_STYLE: &str = r#"    <script type="text/javascript" src="https://code.jquery.com/jquery-3.5.1.min.js"></script>
    <script type="text/javascript" src="https://cdn.datatables.net/1.11.5/js/jquery.dataTables.min.js"></script>
    <link rel="stylesheet" type="text/css" href="https://cdn.datatables.net/1.11.5/css/jquery.dataTables.css">
    <style>
        html.loading { visibility: hidden; }
        body { font-family: Arial, sans-serif; background-color: #000; color: #fff; margin: 20px; padding: 20px; }
        .container { max-width: 1200px; margin: 0 auto; }
        h1 { color: #fff; border-bottom: 2px solid #333; padding-bottom: 10px; }
        a { color: #4a9eff; text-decoration: none; }
        a:hover { color: #66b3ff; text-decoration: underline; }
        table.dataTable, .dataTables_wrapper, .dataTables_wrapper tbody,
        .dataTables_wrapper tbody tr, .dataTables_wrapper tbody td,
        .dataTables_wrapper label, .dataTables_wrapper .dataTables_info {
            background-color: #000 !important; color: #fff !important;
        }
        .dataTables_wrapper thead th {
            background-color: #1a1a1a !important; color: #fff !important;
            font-weight: bold; border: 1px solid #333; cursor: pointer; padding: 8px;
        }
        .dataTables_wrapper td { border: 1px solid #333; padding: 8px; }
        .dataTables_wrapper td:not(:first-child) { text-align: right !important; }
        .dataTables_wrapper tbody tr:hover td { background-color: #1a1a1a !important; }
        .dataTables_wrapper .dataTables_paginate .paginate_button {
            color: #fff !important; border: 1px solid #333; background-color: #1a1a1a;
            margin: 0 4px; padding: 5px 10px;
        }
        .dataTables_wrapper .dataTables_paginate .paginate_button.current,
        .dataTables_wrapper .dataTables_paginate .paginate_button:hover {
            background-color: #2d2d2d !important; color: #fff !important;
        }
        .dataTables_wrapper .dataTables_length select,
        .dataTables_wrapper .dataTables_filter input {
            background-color: #1a1a1a !important; color: #fff !important;
            border: 1px solid #333; padding: 5px; margin: 0 5px;
        }
        .dataTables_wrapper tbody tr.high-trades td { color: #00ff00 !important; font-weight: bold !important; }
    </style>
    <script type="text/javascript">
        document.documentElement.className = 'loading';
    </script>
"#;

const TABLE_SCRIPT: &str = r#"    <script>
        $(document).ready(function() {
            $('#stockTable').DataTable({
                "order": [[7, "desc"]],
                "pageLength": 25,
                "columnDefs": [
                    { "type": "num", "targets": [1,2,3,4,5,6,7,8,9,10] }
                ]
            });
            document.documentElement.className = '';
        });
    </script>
"#;
