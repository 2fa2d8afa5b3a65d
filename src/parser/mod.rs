pub mod blocks;
pub mod components;

pub use blocks::{first_image, Block, ImageRef};

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::error::{Error, Result};

static COMPONENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".se-main-container .se-component").unwrap());

/// Walk the post's top-level components in document order and map each onto
/// zero-or-more IR blocks. The discriminator is the element's second class
/// token ("se-component se-text" → "se-text"). Unknown discriminators abort
/// the parse: the IR has no variant to degrade unknown content into.
pub fn parse_components(document: &Html) -> Result<Vec<Block>> {
    let mut out = Vec::new();

    for component in document.select(&COMPONENT_SEL) {
        let class_attr = component.value().attr("class").unwrap_or_default();
        let discriminator = match class_attr.split_whitespace().nth(1) {
            Some(token) => token,
            None => return Err(Error::UnrecognizedComponent(class_attr.trim().to_string())),
        };

        match discriminator {
            "se-sectionTitle" => out.push(components::section_title_component(component)),
            "se-text" => out.extend(components::text_component(component)),
            "se-image" => out.push(components::image_component(component)?),
            "se-imageGroup" => out.push(components::image_group_component(component)),
            // Inert components: nothing worth carrying into the document.
            "se-placesMap" | "se-oglink" => {}
            unknown => return Err(Error::UnrecognizedComponent(unknown.to_string())),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Result<Vec<Block>> {
        parse_components(&Html::parse_document(html))
    }

    fn wrap(components: &str) -> String {
        format!(r#"<div class="se-main-container">{components}</div>"#)
    }

    #[test]
    fn sample_post_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/sample_post.html").unwrap();
        let blocks = parse(&html).unwrap();

        assert_eq!(
            blocks,
            vec![
                Block::SectionTitle("여행 첫째 날".into()),
                Block::Paragraph("서울에서 출발했다.".into()),
                Block::Paragraph("".into()),
                Block::Paragraph("밤 늦게 도착해서 바로 잤다.".into()),
                Block::Image(ImageRef::new(
                    "https://blogfiles.pstatic.net/20240101/terminal.jpg",
                    "터미널 앞에서"
                )),
                Block::ImageGroup(vec![
                    ImageRef::new("https://blogfiles.pstatic.net/20240101/sea-1.jpg", "바다"),
                    ImageRef::new("https://blogfiles.pstatic.net/20240101/sea-2.jpg", "바다"),
                ]),
            ]
        );
    }

    #[test]
    fn unknown_discriminator_is_fatal() {
        let html = wrap(r#"<div class="se-component se-unknownThing"></div>"#);
        match parse(&html) {
            Err(Error::UnrecognizedComponent(kind)) => assert_eq!(kind, "se-unknownThing"),
            other => panic!("expected UnrecognizedComponent, got {other:?}"),
        }
    }

    #[test]
    fn unknown_component_aborts_remaining_sequence() {
        let html = wrap(
            r#"<div class="se-component se-unknownThing"></div>
               <div class="se-component se-sectionTitle">after</div>"#,
        );
        assert!(parse(&html).is_err());
    }

    #[test]
    fn inert_components_yield_nothing() {
        let html = wrap(
            r#"<div class="se-component se-placesMap"><span>map widget</span></div>
               <div class="se-component se-oglink"><a href="http://x">link card</a></div>"#,
        );
        assert_eq!(parse(&html).unwrap(), vec![]);
    }

    #[test]
    fn components_outside_main_container_are_ignored() {
        let html = r#"<div class="se-component se-unknownThing"></div>
                      <div class="se-main-container"></div>"#;
        assert_eq!(parse(html).unwrap(), vec![]);
    }

    #[test]
    fn order_is_preserved() {
        let html = wrap(
            r#"<div class="se-component se-sectionTitle"> Intro </div>
               <div class="se-component se-text"><p class="se-text-paragraph">Hello</p></div>
               <div class="se-component se-image"><img src="http://x/a.jpg?x=1"><div class="se-caption">cap</div></div>"#,
        );
        assert_eq!(
            parse(&html).unwrap(),
            vec![
                Block::SectionTitle("Intro".into()),
                Block::Paragraph("Hello".into()),
                Block::Image(ImageRef::new("http://x/a.jpg", "cap")),
            ]
        );
    }
}
