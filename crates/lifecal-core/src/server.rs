use anyhow::{Context, anyhow, bail};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::calendar::ReferenceDate;
use crate::draw::{RenderRequest, assemble};
use crate::render::{OutputFormat, render_to_string};
use crate::style::StyleConfig;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_WIDTH: u32 = 1179;
pub const DEFAULT_HEIGHT: u32 = 2556;
pub const MAX_DIMENSION: u32 = 10_000;

const YEAR_PATH: &str = "/year";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearQuery {
    pub width: u32,
    pub height: u32,
    pub date: Option<ReferenceDate>,
    pub format: OutputFormat,
}

impl Default for YearQuery {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            date: None,
            format: OutputFormat::Svg,
        }
    }
}

impl YearQuery {
    /// Parses the query string of `/year`. Keys and values are percent-decoded;
    /// unknown parameters are ignored.
    pub fn parse(query: &str) -> anyhow::Result<Self> {
        let mut out = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.as_ref();
            match key.as_ref() {
                "width" => out.width = parse_dimension("width", value)?,
                "height" => out.height = parse_dimension("height", value)?,
                "date" => out.date = Some(ReferenceDate::parse(value)?),
                "format" => {
                    out.format = match value {
                        "svg" => OutputFormat::Svg,
                        "json" => OutputFormat::Json,
                        other => bail!("unsupported format: {other}"),
                    }
                }
                other => debug!(key = other, "ignoring query parameter"),
            }
        }

        Ok(out)
    }
}

fn parse_dimension(name: &str, value: &str) -> anyhow::Result<u32> {
    let parsed: u32 = value
        .trim()
        .parse()
        .map_err(|_| anyhow!("{name} must be a positive integer, got {value:?}"))?;
    if parsed == 0 || parsed > MAX_DIMENSION {
        bail!("{name} must be between 1 and {MAX_DIMENSION}, got {parsed}");
    }
    Ok(parsed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }
}

/// Answers one `GET` for `url` (path plus optional query).
#[tracing::instrument(skip(style))]
pub fn handle(url: &str, style: &StyleConfig, today: ReferenceDate) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    if path != YEAR_PATH {
        return Reply::text(404, "not found\n");
    }

    let query = match YearQuery::parse(query) {
        Ok(query) => query,
        Err(err) => {
            debug!(error = %err, "rejecting request");
            return Reply::text(400, format!("{err}\n"));
        }
    };

    let request = RenderRequest {
        width: query.width,
        height: query.height,
        date: query.date.unwrap_or(today),
    };
    let tree = assemble(&request, style);

    match render_to_string(&tree, query.format, false) {
        Ok(body) => Reply {
            status: 200,
            content_type: query.format.content_type(),
            body,
        },
        Err(err) => {
            warn!(error = %err, "render failed");
            Reply::text(500, "render failed\n")
        }
    }
}

/// Serves `/year` until the listener fails. Requests are answered one at a time.
pub fn serve(addr: &str, style: &StyleConfig) -> anyhow::Result<()> {
    let server = Server::http(addr).map_err(|err| anyhow!("failed to bind {addr}: {err}"))?;
    info!(%addr, "serving year images on /year");

    for request in server.incoming_requests() {
        if let Err(err) = respond(request, style) {
            warn!(error = %err, "failed to send response");
        }
    }

    Ok(())
}

fn respond(request: Request, style: &StyleConfig) -> anyhow::Result<()> {
    let reply = if *request.method() == Method::Get {
        handle(request.url(), style, ReferenceDate::today_utc())
    } else {
        Reply::text(405, "method not allowed\n")
    };

    debug!(
        method = %request.method(),
        url = request.url(),
        status = reply.status,
        bytes = reply.body.len(),
        "request handled"
    );

    let response = Response::from_string(reply.body)
        .with_status_code(reply.status)
        .with_header(header("Content-Type", reply.content_type)?)
        .with_header(header("Cache-Control", "no-store")?);

    request.respond(response).context("failed to write response")
}

fn header(name: &str, value: &str) -> anyhow::Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| anyhow!("invalid header {name}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> ReferenceDate {
        ReferenceDate::parse("2026-10-17").expect("valid date")
    }

    #[test]
    fn defaults_apply_to_empty_query() {
        assert_eq!(YearQuery::parse("").expect("parse"), YearQuery::default());
    }

    #[test]
    fn query_overrides_defaults() {
        let query = YearQuery::parse("width=800&height=1600&date=2024-03-01&format=json&x=1")
            .expect("parse");
        assert_eq!(query.width, 800);
        assert_eq!(query.height, 1600);
        assert_eq!(
            query.date,
            Some(ReferenceDate::parse("2024-03-01").expect("valid date"))
        );
        assert_eq!(query.format, OutputFormat::Json);
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let query =
            YearQuery::parse("date=2024%2D03%2D01&width=%20390&format=js%6Fn").expect("parse");
        assert_eq!(
            query.date,
            Some(ReferenceDate::parse("2024-03-01").expect("valid date"))
        );
        assert_eq!(query.width, 390);
        assert_eq!(query.format, OutputFormat::Json);

        let reply = handle("/year?date=2024%2D03%2D01", &StyleConfig::default(), today());
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains(">305d left</text>"));
    }

    #[test]
    fn bad_query_values_are_rejected() {
        for bad in [
            "width=0",
            "width=-5",
            "height=abc",
            "height=20000",
            "date=2024-13-01",
            "date=",
            "format=png",
            "format=preview",
        ] {
            assert!(YearQuery::parse(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn year_svg_response() {
        let reply = handle("/year?date=2024-03-01", &StyleConfig::default(), today());
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "image/svg+xml");
        assert!(reply.body.contains(">305d left</text>"));
    }

    #[test]
    fn missing_date_uses_today() {
        let reply = handle("/year?format=json", &StyleConfig::default(), today());
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/json");
        assert!(reply.body.contains("\"date\": \"2026-10-17\""));
    }

    #[test]
    fn errors_map_to_status_codes() {
        let style = StyleConfig::default();
        assert_eq!(handle("/year?width=nope", &style, today()).status, 400);
        assert_eq!(handle("/", &style, today()).status, 404);
        assert_eq!(handle("/years", &style, today()).status, 404);
    }
}
