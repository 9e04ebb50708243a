//! Search links shown beside astronauts and crafts.

use astro_common::ExternalLinks;

pub fn wikipedia_search_link(name: &str) -> String {
    format!(
        "https://en.wikipedia.org/w/index.php?search={}",
        urlencoding::encode(name)
    )
}

pub fn google_search_link(query: &str) -> String {
    format!("https://www.google.com/search?q={}", urlencoding::encode(query))
}

/// Links for a person; the Google query is qualified with "astronaut".
pub fn astronaut_links(name: &str) -> ExternalLinks {
    ExternalLinks {
        wikipedia: wikipedia_search_link(name),
        google: google_search_link(&format!("{} astronaut", name)),
    }
}

/// Links for a craft; the Google query is qualified with "spacecraft".
pub fn craft_links(name: &str) -> ExternalLinks {
    ExternalLinks {
        wikipedia: wikipedia_search_link(name),
        google: google_search_link(&format!("{} spacecraft", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_are_encoded() {
        let links = astronaut_links("Oleg Kononenko");
        assert_eq!(
            links.wikipedia,
            "https://en.wikipedia.org/w/index.php?search=Oleg%20Kononenko"
        );
        assert_eq!(
            links.google,
            "https://www.google.com/search?q=Oleg%20Kononenko%20astronaut"
        );
        assert!(craft_links("Tiangong").google.ends_with("Tiangong%20spacecraft"));
    }
}
