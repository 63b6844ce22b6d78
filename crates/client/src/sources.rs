//! Where articles come from when the user does not name one.
//!
//! `spin` draws from a fixed list of curated open-access sources, or from
//! links discovered in earlier articles when exploring is enabled. When no
//! article can be fetched, a bundled passage stands in.

use magpie_core::HistoryEntry;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

/// A named group of article URLs.
#[derive(Debug, Clone, Copy)]
pub struct CuratedSource {
    pub name: &'static str,
    pub urls: &'static [&'static str],
}

pub const CURATED_SOURCES: &[CuratedSource] = &[
    CuratedSource {
        name: "Wikipedia",
        urls: &[
            "https://en.wikipedia.org/wiki/Poetry",
            "https://en.wikipedia.org/wiki/Erasure_poetry",
            "https://en.wikipedia.org/wiki/Blackout_poetry",
            "https://en.wikipedia.org/wiki/Found_poetry",
            "https://en.wikipedia.org/wiki/Cut-up_technique",
            "https://en.wikipedia.org/wiki/Dadaism",
            "https://en.wikipedia.org/wiki/Surrealism",
            "https://en.wikipedia.org/wiki/Ocean",
            "https://en.wikipedia.org/wiki/Memory",
            "https://en.wikipedia.org/wiki/Language",
        ],
    },
    CuratedSource {
        name: "The Conversation",
        urls: &[
            "https://theconversation.com/what-is-art-for-147458",
            "https://theconversation.com/the-power-of-poetry-in-a-pandemic-143287",
        ],
    },
    CuratedSource {
        name: "Aeon",
        urls: &[
            "https://aeon.co/essays/how-does-language-change-the-way-we-think",
            "https://aeon.co/essays/why-we-need-to-take-poetry-more-seriously",
        ],
    },
    CuratedSource {
        name: "Project Gutenberg",
        urls: &[
            "https://www.gutenberg.org/files/1342/1342-h/1342-h.htm",
            "https://www.gutenberg.org/files/84/84-h/84-h.htm",
            "https://www.gutenberg.org/files/2701/2701-h/2701-h.htm",
            "https://www.gutenberg.org/files/11/11-h/11-h.htm",
        ],
    },
    CuratedSource {
        name: "Public Domain Review",
        urls: &[
            "https://publicdomainreview.org/essay/the-art-of-music-copying",
            "https://publicdomainreview.org/essay/a-divine-madness",
        ],
    },
];

/// Label used for picks taken from the discovered-link history.
pub const DISCOVERED_SOURCE: &str = "Discovered";

/// A bundled passage used when no article is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FallbackText {
    pub title: &'static str,
    pub content: &'static str,
}

pub const FALLBACK_TEXTS: &[FallbackText] = &[
    FallbackText {
        title: "Harbour at Dusk",
        content: "The boats came in one by one as the light went out of the water. Gulls argued over the last of \
                  the catch while the harbour master counted hulls against the tide table.\n\n\
                  Nobody spoke of the storm that had passed in the night. The ropes were coiled, the nets were \
                  hung to dry, and the lamps along the quay were lit before anyone thought to ask for them.",
    },
    FallbackText {
        title: "Notes on Maps",
        content: "Every map is an argument about what matters. A road atlas forgets the rivers it crosses, and a \
                  nautical chart forgets almost everything on land.\n\n\
                  The oldest surviving maps show cities larger than the seas around them. Their makers were not \
                  wrong about distance so much as honest about attention.",
    },
    FallbackText {
        title: "The Archive Room",
        content: "Boxes of letters line the shelves, each labelled in a hand that changes every decade. Some \
                  envelopes were never opened and some were opened many times.\n\n\
                  The archivist keeps a pencil behind one ear and a list of missing years in a drawer. She says \
                  the gaps tell you as much as the pages, if you know how long to look at them.",
    },
    FallbackText {
        title: "Weather Report",
        content: "Morning fog will lift slowly from the valleys, leaving a pale sky and a light wind from the \
                  west. Expect long shadows by afternoon and a sharp chill after sunset.\n\n\
                  Tomorrow brings rain to the hills first and the town later, steady rather than heavy, the kind \
                  that keeps people indoors reading things they meant to finish years ago.",
    },
];

/// A URL chosen by `spin`, with the group it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpinPick {
    pub source: String,
    pub url: String,
}

/// Random URL from a random curated source.
pub fn pick_curated<R: Rng + ?Sized>(rng: &mut R) -> Option<SpinPick> {
    let source = CURATED_SOURCES.choose(rng)?;
    let url = source.urls.choose(rng)?;
    Some(SpinPick { source: source.name.to_string(), url: url.to_string() })
}

/// Choose the next article to open.
///
/// With `explore` set and unvisited discovered links available, half of the
/// spins go to a discovered link; the rest use the curated list.
pub fn pick_spin_target<R: Rng + ?Sized>(
    rng: &mut R, explore: bool, unvisited: &[HistoryEntry],
) -> Option<SpinPick> {
    if explore
        && !unvisited.is_empty()
        && rng.gen_bool(0.5)
        && let Some(entry) = unvisited.choose(rng)
    {
        return Some(SpinPick { source: DISCOVERED_SOURCE.to_string(), url: entry.url.clone() });
    }
    pick_curated(rng)
}

/// Index of a fallback text, never equal to `previous` when there is a choice.
pub fn pick_fallback<R: Rng + ?Sized>(rng: &mut R, previous: Option<usize>) -> usize {
    let len = FALLBACK_TEXTS.len();
    match previous {
        Some(previous) if len > 1 && previous < len => {
            let index = rng.gen_range(0..len - 1);
            if index >= previous { index + 1 } else { index }
        }
        _ => rng.gen_range(0..len),
    }
}
