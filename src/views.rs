//! Server-rendered HTML for the landing and forecast pages.

use crate::models::PredictionReport;

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; background: #f5f7fa; color: #1f2933; }
header { background: #102a43; color: #fff; padding: 1.25rem 2rem; }
main { max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
.card { background: #fff; border-radius: 8px; padding: 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
.figure { font-size: 2rem; font-weight: 600; }
.muted { color: #627d98; }
.legend span { margin-right: 1.5rem; }
.swatch { display: inline-block; width: 12px; height: 12px; margin-right: .4rem; vertical-align: middle; }
img { max-width: 100%; height: auto; }
input[type=text] { padding: .5rem; font-size: 1rem; width: 12rem; text-transform: uppercase; }
button { padding: .55rem 1.2rem; font-size: 1rem; background: #243b53; color: #fff; border: 0; border-radius: 4px; }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<header><a href="/home" style="color:#fff;text-decoration:none"><strong>Share Sensei</strong></a></header>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

pub fn render_index() -> String {
    layout(
        "Share Sensei",
        r#"<section class="card">
<h1>Next-day stock price forecast</h1>
<p class="muted">Enter a ticker symbol to forecast its next trading day close from daily history since 2010.</p>
<form action="/predict" method="post">
<input type="text" name="ticker" placeholder="e.g. AAPL" required maxlength="15">
<button type="submit">Forecast</button>
</form>
</section>"#,
    )
}

pub fn render_output(report: &PredictionReport) -> String {
    let company = &report.company;
    let website = match company.website.as_deref() {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => format!(
            r#"<a href="{0}" rel="noopener noreferrer">{0}</a>"#,
            escape_html(url)
        ),
        Some(other) => escape_html(other),
        None => "n/a".to_string(),
    };
    let employees = company
        .employees
        .map(|e| e.to_string())
        .unwrap_or_else(|| "n/a".to_string());

    let body = format!(
        r#"<section class="card">
<h1>{ticker}</h1>
<p class="muted">Forecast for {forecast_date}, trained on history from {min_date} to {max_date}</p>
<p class="figure">{forecast:.2} <span class="muted">&plusmn; {bound:.2}</span></p>
<p class="muted">Uncertainty shown as a {width:.0}% interval</p>
</section>
<section class="card">
<h2>{ticker} model forecast analysis</h2>
<img alt="{ticker} forecast chart" src="data:image/png;base64,{plot_image}">
<p class="legend muted">
<span><i class="swatch" style="background:#1f77b4"></i>Actual close</span>
<span><i class="swatch" style="background:#d62728"></i>Forecast</span>
<span><i class="swatch" style="background:rgba(214,39,40,.2)"></i>Forecast uncertainty</span>
</p>
<p class="muted">x: date (last {window} trading days), y: close price</p>
</section>
<section class="card">
<h2>Company</h2>
<table>
<tr><th align="left">Sector</th><td>{sector}</td></tr>
<tr><th align="left">Country</th><td>{country}</td></tr>
<tr><th align="left">Website</th><td>{website}</td></tr>
<tr><th align="left">Employees</th><td>{employees}</td></tr>
</table>
<p>{summary}</p>
</section>
<p><a href="/home">Forecast another ticker</a></p>"#,
        ticker = escape_html(&report.ticker),
        forecast_date = report.forecast.date,
        min_date = report.min_date,
        max_date = report.max_date,
        forecast = report.rounded_forecast(),
        bound = report.rounded_bound(),
        width = report.forecast.interval_width * 100.0,
        plot_image = report.plot_image,
        window = report.chart_window,
        sector = or_na(company.sector.as_deref()),
        country = or_na(company.country.as_deref()),
        website = website,
        employees = employees,
        summary = or_na(company.summary.as_deref()),
    );

    layout(&format!("{} forecast", report.ticker), &body)
}

fn or_na(value: Option<&str>) -> String {
    value.map(escape_html).unwrap_or_else(|| "n/a".to_string())
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyInfo, ForecastResult};
    use chrono::NaiveDate;

    fn report() -> PredictionReport {
        PredictionReport {
            ticker: "AAPL".to_string(),
            company: CompanyInfo {
                sector: Some("Technology".to_string()),
                summary: Some("Makes <phones> & more".to_string()),
                country: Some("United States".to_string()),
                website: Some("https://www.apple.com".to_string()),
                employees: Some(161_000),
            },
            min_date: NaiveDate::from_ymd_opt(2010, 1, 4).unwrap(),
            max_date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            forecast: ForecastResult {
                date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
                yhat: 182.456,
                yhat_lower: 179.0,
                yhat_upper: 186.0,
                interval_width: 0.8,
            },
            plot_image: "iVBORw0KGgo=".to_string(),
            chart_window: 365,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_index_has_form() {
        let html = render_index();
        assert!(html.contains(r#"action="/predict""#));
        assert!(html.contains(r#"name="ticker""#));
    }

    #[test]
    fn test_output_contents() {
        let html = render_output(&report());

        assert!(html.contains("<h1>AAPL</h1>"));
        assert!(html.contains("182.46"));
        assert!(html.contains("&plusmn; 3.50"));
        assert!(html.contains("2024-01-08"));
        assert!(html.contains("2010-01-04 to 2024-01-07"));
        assert!(html.contains("data:image/png;base64,iVBORw0KGgo="));
        assert!(html.contains("Makes &lt;phones&gt; &amp; more"));
        assert!(html.contains("161000"));
    }

    #[test]
    fn test_output_missing_company_fields() {
        let mut r = report();
        r.company = CompanyInfo::default();
        let html = render_output(&r);
        assert!(html.contains("<td>n/a</td>"));
    }
}
