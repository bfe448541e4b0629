//! The request loop: blocking, one connection at a time, GET/HEAD only.
//! Exactly enough HTTP to hand out installer files.

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use rustls::{ServerConfig, ServerConnection, StreamOwned};

const SERVER: &str = "simplehttpd";

/// Accept loop; never returns. Per-connection failures are logged and the
/// next connection is accepted.
pub fn serve_forever(listener: TcpListener, webroot: &Path, tls: Option<Arc<ServerConfig>>) -> ! {
    loop {
        let (stream, peer) = match listener.accept() {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(%err, "accept failed");
                continue;
            }
        };
        tracing::debug!(%peer, "connection");

        let result = match &tls {
            Some(config) => match ServerConnection::new(config.clone()) {
                Ok(conn) => handle_connection(StreamOwned::new(conn, stream), webroot),
                Err(err) => {
                    tracing::warn!(%err, "tls session setup failed");
                    continue;
                }
            },
            None => handle_connection(stream, webroot),
        };

        if let Err(err) = result {
            tracing::debug!(%peer, %err, "request failed");
        }
    }
}

fn handle_connection<S: Read + Write>(stream: S, webroot: &Path) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // drain headers; nothing in them changes how a file is served
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let mut stream = reader.into_inner();
    respond(&mut stream, webroot, request_line.trim_end())?;
    stream.flush()
}

fn respond<S: Write>(stream: &mut S, webroot: &Path, request_line: &str) -> std::io::Result<()> {
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method, target),
        _ => return send_error(stream, 400, "Bad Request", true),
    };
    tracing::info!(method, target, "request");

    let head_only = match method {
        "GET" => false,
        "HEAD" => true,
        _ => return send_error(stream, 501, "Unsupported method", true),
    };

    let path = match resolve_path(webroot, target) {
        Some(path) => path,
        None => return send_error(stream, 404, "File not found", head_only),
    };

    if path.is_dir() {
        let path_part = target.split(['?', '#']).next().unwrap_or(target);
        if !path_part.ends_with('/') {
            return send_redirect(stream, &format!("{path_part}/"));
        }
        let index = path.join("index.html");
        if index.is_file() {
            return send_file(stream, &index, head_only);
        }
        return match directory_listing(&path, path_part) {
            Ok(body) => send_ok(stream, "text/html; charset=utf-8", body.as_bytes(), head_only),
            Err(_) => send_error(stream, 404, "No permission to list directory", head_only),
        };
    }

    if path.is_file() {
        return send_file(stream, &path, head_only);
    }
    send_error(stream, 404, "File not found", head_only)
}

/// Map a request target onto the webroot. Query strings are dropped, the
/// path is percent-decoded, and any `..` segment rejects the request
/// outright rather than risking an escape.
pub fn resolve_path(webroot: &Path, target: &str) -> Option<PathBuf> {
    let path = target.split(['?', '#']).next().unwrap_or(target);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;

    let mut resolved = webroot.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            segment if segment.contains('\0') => return None,
            segment => resolved.push(segment),
        }
    }
    Some(resolved)
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("txt") | Some("log") | Some("cfg") | Some("conf") => "text/plain; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "text/xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("gz") => "application/gzip",
        _ => "application/octet-stream",
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn directory_listing(dir: &Path, shown_path: &str) -> std::io::Result<String> {
    let shown = html_escape(shown_path);
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    let mut body = String::new();
    body.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    body.push_str(&format!("<title>Directory listing for {shown}</title>\n"));
    body.push_str("</head>\n<body>\n");
    body.push_str(&format!("<h1>Directory listing for {shown}</h1>\n<hr>\n<ul>\n"));
    for name in names {
        let escaped = html_escape(&name);
        body.push_str(&format!("<li><a href=\"{escaped}\">{escaped}</a></li>\n"));
    }
    body.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(body)
}

// installer images can be GB-sized; stream instead of slurping
fn send_file<S: Write>(stream: &mut S, path: &Path, head_only: bool) -> std::io::Result<()> {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(_) => return send_error(stream, 404, "File not found", head_only),
    };
    let len = file.metadata()?.len();
    write!(
        stream,
        "HTTP/1.0 200 OK\r\nServer: {SERVER}\r\nContent-Type: {}\r\n\
         Content-Length: {len}\r\nConnection: close\r\n\r\n",
        content_type(path)
    )?;
    if !head_only {
        std::io::copy(&mut file, stream)?;
    }
    Ok(())
}

fn send_ok<S: Write>(
    stream: &mut S,
    content_type: &str,
    body: &[u8],
    head_only: bool,
) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.0 200 OK\r\nServer: {SERVER}\r\nContent-Type: {content_type}\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )?;
    if !head_only {
        stream.write_all(body)?;
    }
    Ok(())
}

fn send_redirect<S: Write>(stream: &mut S, location: &str) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.0 301 Moved Permanently\r\nServer: {SERVER}\r\nLocation: {location}\r\n\
         Content-Length: 0\r\nConnection: close\r\n\r\n"
    )
}

fn send_error<S: Write>(
    stream: &mut S,
    code: u16,
    reason: &str,
    head_only: bool,
) -> std::io::Result<()> {
    let body = format!(
        "<!DOCTYPE html>\n<html><head><title>{code} {reason}</title></head>\n\
         <body><h1>{code} {reason}</h1></body></html>\n"
    );
    write!(
        stream,
        "HTTP/1.0 {code} {reason}\r\nServer: {SERVER}\r\nContent-Type: text/html; \
         charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )?;
    if !head_only {
        stream.write_all(body.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_plain_paths() {
        let root = Path::new("/srv/www");
        assert_eq!(
            resolve_path(root, "/files/image.iso"),
            Some(PathBuf::from("/srv/www/files/image.iso"))
        );
        assert_eq!(resolve_path(root, "/"), Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn resolve_drops_query_and_decodes() {
        let root = Path::new("/srv/www");
        assert_eq!(
            resolve_path(root, "/a%20b.txt?download=1"),
            Some(PathBuf::from("/srv/www/a b.txt"))
        );
    }

    #[test]
    fn resolve_rejects_traversal() {
        let root = Path::new("/srv/www");
        assert_eq!(resolve_path(root, "/../etc/passwd"), None);
        assert_eq!(resolve_path(root, "/a/../../etc/passwd"), None);
        assert_eq!(resolve_path(root, "/%2e%2e/etc/passwd"), None);
    }

    #[test]
    fn resolve_collapses_dot_and_empty_segments() {
        let root = Path::new("/srv/www");
        assert_eq!(
            resolve_path(root, "//a/./b"),
            Some(PathBuf::from("/srv/www/a/b"))
        );
    }

    #[test]
    fn content_types() {
        assert_eq!(
            content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(content_type(Path::new("core.ISO")), "application/octet-stream");
        assert_eq!(content_type(Path::new("bundle.tar.gz")), "application/gzip");
    }

    fn request(webroot: &Path, request_line: &str) -> String {
        let mut out = Vec::new();
        respond(&mut out, webroot, request_line).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn serves_file_contents_with_length() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("greeting.txt"), "hello installer").unwrap();

        let response = request(dir.path(), "GET /greeting.txt HTTP/1.0");
        assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(response.contains("Content-Length: 15\r\n"));
        assert!(response.ends_with("\r\n\r\nhello installer"));
    }

    #[test]
    fn directory_serves_index_html_when_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/index.html"), "<h1>welcome</h1>").unwrap();

        let response = request(dir.path(), "GET /sub/ HTTP/1.0");
        assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/html"));
        assert!(response.ends_with("<h1>welcome</h1>"));
    }

    #[test]
    fn directory_without_index_gets_a_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pub")).unwrap();
        fs::write(dir.path().join("pub/a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("pub/nested")).unwrap();

        let response = request(dir.path(), "GET /pub/ HTTP/1.0");
        assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(response.contains("Directory listing for /pub/"));
        assert!(response.contains("<a href=\"a.txt\">a.txt</a>"));
        assert!(response.contains("<a href=\"nested/\">nested/</a>"));
    }

    #[test]
    fn directory_without_trailing_slash_redirects() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pub")).unwrap();

        let response = request(dir.path(), "GET /pub HTTP/1.0");
        assert!(response.starts_with("HTTP/1.0 301 Moved Permanently\r\n"));
        assert!(response.contains("Location: /pub/\r\n"));

        // query string must not leak into the redirect target
        let response = request(dir.path(), "GET /pub?x=1 HTTP/1.0");
        assert!(response.contains("Location: /pub/\r\n"));
    }

    #[test]
    fn missing_file_is_404_and_unknown_method_is_501() {
        let dir = tempfile::tempdir().unwrap();
        let response = request(dir.path(), "GET /nope.txt HTTP/1.0");
        assert!(response.starts_with("HTTP/1.0 404 File not found\r\n"));

        let response = request(dir.path(), "POST /nope.txt HTTP/1.0");
        assert!(response.starts_with("HTTP/1.0 501 Unsupported method\r\n"));
    }

    #[test]
    fn error_response_shape() {
        let mut out = Vec::new();
        send_error(&mut out, 404, "File not found", false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.0 404 File not found\r\n"));
        assert!(text.contains("\r\n\r\n<!DOCTYPE html>"));
    }

    #[test]
    fn head_omits_body() {
        let mut out = Vec::new();
        send_ok(&mut out, "text/plain; charset=utf-8", b"hello", true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
