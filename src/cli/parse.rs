//! Offline link extraction, handy for checking what an invite will resolve to.

use anyhow::Result;

use crate::cli::args::ParseCliArgs;
use crate::zoom::{extract_meeting_id, extract_passcode, reference_from_text, ZoomReference};

pub fn handle_parse_command(args: ParseCliArgs) -> Result<()> {
    let text = args.text.join(" ");
    print!("{}", describe(&text));
    Ok(())
}

fn describe(text: &str) -> String {
    let Some(reference) = reference_from_text(text) else {
        return "No Zoom link found\n".to_string();
    };

    let mut out = String::new();
    if let ZoomReference::Url { url } = &reference {
        out.push_str(&format!("URL:        {}\n", url));
        if let Some(id) = extract_meeting_id(url) {
            out.push_str(&format!("Meeting ID: {}\n", id));
        }
        if let Some(pwd) = extract_passcode(url) {
            out.push_str(&format!("Passcode:   {}\n", pwd));
        }
    }
    if let Some(link) = reference.join_url() {
        out.push_str(&format!("Join with:  {}\n", link));
    }
    out
}
