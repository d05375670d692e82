//! HTML rendering of library listings.
//!
//! Pages are produced with the `quick-xml` writer, which takes care of
//! escaping names and attribute values.  Links into the library use
//! `/library/{path}`; covers and tracks are served via `/stream/{path}`.
//! Tracks are played by one shared control bar driven by the embedded
//! player script, served from `/static/{version}/player.js`.

use percent_encoding::utf8_percent_encode;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::library::MediaListing;
use crate::storage::entry::Directory;
use crate::storage::KEY_ENCODE_SET;

/// The in-page player, embedded into the binary.
pub const PLAYER_JS: &str = include_str!("../static/player.js");

/// URL of the player script for a given static asset version.
pub fn player_href(static_version: &str) -> String {
    format!("/static/{static_version}/player.js")
}

/// URL of the listing page for a virtual path.
pub fn library_href(path: &str) -> String {
    format!("/library/{}", utf8_percent_encode(path, KEY_ENCODE_SET))
}

/// URL that redirects to the content of a file.
pub fn stream_href(path: &str) -> String {
    format!("/stream/{}", utf8_percent_encode(path, KEY_ENCODE_SET))
}

/// Human-readable byte count, e.g. `4.2 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn directory_title(dir: &Directory) -> &str {
    if dir.is_root() {
        "Library"
    } else {
        dir.name()
    }
}

// ── Listing page ────────────────────────────────────────────────────

/// Render the HTML page for one directory listing.
///
/// `static_version` selects the asset path the player script is loaded from.
pub fn render_listing(listing: &MediaListing, static_version: &str) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let current = &listing.current_directory;

    writer
        .write_event(Event::DocType(BytesText::from_escaped("html")))
        .expect("doctype");
    start(&mut writer, "html", &[("lang", "en")]);

    start(&mut writer, "head", &[]);
    empty(&mut writer, "meta", &[("charset", "utf-8")]);
    empty(
        &mut writer,
        "meta",
        &[
            ("name", "viewport"),
            ("content", "width=device-width, initial-scale=1"),
        ],
    );
    text_element(&mut writer, "title", &[], directory_title(current));
    if !listing.audio_tracks.is_empty() {
        let src = player_href(static_version);
        // <script> must not be self-closing.
        start(&mut writer, "script", &[("src", &src), ("defer", "defer")]);
        end(&mut writer, "script");
    }
    end(&mut writer, "head");

    start(&mut writer, "body", &[]);
    write_breadcrumbs(&mut writer, current);

    if let Some(cover) = &listing.cover {
        let src = stream_href(cover.path());
        start(&mut writer, "div", &[("class", "cover")]);
        empty(&mut writer, "img", &[("src", &src), ("alt", cover.name())]);
        end(&mut writer, "div");
    }

    if !listing.directories.is_empty() {
        start(&mut writer, "ul", &[("class", "directories")]);
        for dir in &listing.directories {
            let href = library_href(dir.path());
            start(&mut writer, "li", &[]);
            text_element(&mut writer, "a", &[("href", &href)], dir.name());
            end(&mut writer, "li");
        }
        end(&mut writer, "ul");
    }

    if !listing.audio_tracks.is_empty() {
        write_player_bar(&mut writer);
        start(&mut writer, "ol", &[("class", "tracks")]);
        for (index, track) in listing.audio_tracks.iter().enumerate() {
            let url = stream_href(track.path());
            let index = index.to_string();
            text_element(
                &mut writer,
                "li",
                &[
                    ("class", "track"),
                    ("data-index", &index),
                    ("data-url", &url),
                    ("data-title", track.friendly_name()),
                ],
                track.friendly_name(),
            );
        }
        end(&mut writer, "ol");
    }

    if !listing.files.is_empty() {
        start(&mut writer, "ul", &[("class", "files")]);
        for file in &listing.files {
            let href = stream_href(file.path());
            start(&mut writer, "li", &[]);
            text_element(&mut writer, "a", &[("href", &href)], file.name());
            text_element(
                &mut writer,
                "span",
                &[("class", "size")],
                &format_size(file.size),
            );
            end(&mut writer, "li");
        }
        end(&mut writer, "ul");
    }

    end(&mut writer, "body");
    end(&mut writer, "html");

    String::from_utf8(writer.into_inner().into_inner()).expect("valid utf-8")
}

/// `Library / Artist / Album` navigation, the current directory unlinked.
fn write_breadcrumbs(writer: &mut Writer<Cursor<Vec<u8>>>, current: &Directory) {
    start(writer, "nav", &[("class", "breadcrumbs")]);
    for parent in current.parents() {
        let href = library_href(parent.path());
        text_element(writer, "a", &[("href", &href)], directory_title(&parent));
        text(writer, " / ");
    }
    text_element(writer, "span", &[("class", "current")], directory_title(current));
    end(writer, "nav");
}

/// Shared playback controls for all tracks on the page.
fn write_player_bar(writer: &mut Writer<Cursor<Vec<u8>>>) {
    start(writer, "div", &[("class", "player")]);
    text_element(writer, "span", &[("class", "title")], "");
    start(writer, "div", &[("class", "controls")]);
    text_element(
        writer,
        "button",
        &[("type", "button"), ("class", "button-prev"), ("disabled", "disabled")],
        "Prev",
    );
    text_element(
        writer,
        "button",
        &[("type", "button"), ("class", "button-playpause")],
        "Play",
    );
    text_element(
        writer,
        "button",
        &[("type", "button"), ("class", "button-next"), ("disabled", "disabled")],
        "Next",
    );
    end(writer, "div");
    start(writer, "div", &[("class", "progress")]);
    text_element(writer, "span", &[("class", "time-elapsed")], "00:00");
    empty(
        writer,
        "input",
        &[("type", "range"), ("min", "0"), ("max", "100"), ("value", "0")],
    );
    text_element(writer, "span", &[("class", "time-total")], "00:00");
    end(writer, "div");
    end(writer, "div");
}

// ── Helpers ─────────────────────────────────────────────────────────

fn start(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, attrs: &[(&str, &str)]) {
    writer
        .write_event(Event::Start(
            BytesStart::new(tag).with_attributes(attrs.iter().copied()),
        ))
        .expect("start tag");
}

fn empty(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, attrs: &[(&str, &str)]) {
    writer
        .write_event(Event::Empty(
            BytesStart::new(tag).with_attributes(attrs.iter().copied()),
        ))
        .expect("empty tag");
}

fn end(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str) {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .expect("end tag");
}

fn text(writer: &mut Writer<Cursor<Vec<u8>>>, value: &str) {
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .expect("text");
}

/// Write a `<tag attrs>text</tag>` element.
fn text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    tag: &str,
    attrs: &[(&str, &str)],
    value: &str,
) {
    start(writer, tag, attrs);
    text(writer, value);
    end(writer, tag);
}

// ── Tests ───────────────────────────────────────────────────────────
