//! Caption documents and caption tracks.

mod parser;
mod tracks;

pub use parser::{clean_caption_text, parse_caption_xml};
pub use tracks::{
    extract_player_response, extract_raw_track_list, select_track, title_from_html,
    title_from_player_response, tracks_from_player_response, CaptionTrack,
};
