//! Listing page extraction.
//!
//! A listing is read as a set of independent field groups. Each group is a
//! function returning `Result<_, FieldError>`; the record builder settles every
//! group on its own, so a group that cannot be read leaves its fields unset
//! and logs a warning while the rest of the record is still filled in.

use chrono::{NaiveDate, NaiveTime};
use scraper::{ElementRef, Html};
use thiserror::Error;
use tracing::{error, warn};

use crate::error::CrawlError;
use crate::models::{
    ApartmentParameters, ContactInformation, Coordinates, DateInfo, ListingRecord, Location,
    ABSENT_COORDINATES,
};
use crate::scrapers::{absolute_url, css, text_of};

/// Path token in canonical URLs that precedes the numeric listing id
pub const ID_TOKEN: &str = "kvartiry-";

/// "микрорайон" as the site spells it, with Latin p, a and o mixed in
pub const MICRODISTRICT_MARKER: &str = "мик\u{70}ор\u{61}й\u{6f}н";
/// Genitive form that directly precedes the microdistrict name
pub const MICRODISTRICT_PREFIX: &str = "мик\u{70}ор\u{61}й\u{6f}н\u{61} ";

const LABEL_ADDED: &str = "Добавлено";
const LABEL_UPDATED: &str = "Обновлено";
const LABEL_CONTACT: &str = "Контакт:";
const LABEL_COMPANY: &str = "Компания:";
const LABEL_PHONES: &str = "Телефоны:";
const LABEL_PHONE: &str = "Телефон:";
const AREA_TOTAL: &str = "Общая";
const AREA_LIVING: &str = "Жилая";
const AREA_KITCHEN: &str = "Кухня";
const FLOOR_MARKER: &str = " этаж";
const FLOORS_SUFFIX: &str = "-этажного дома";
const SALE_STATUS_MARKER: &str = "Статус продажи: ";
const ADDRESS_PREFIX: &str = "Адрес: ";
const CURRENCY_SUFFIX: &str = "руб.";
const AREA_UNIT: &str = "м²";

/// Removed from the description block, in this order
const DESCRIPTION_BOILERPLATE: [&str; 5] = [
    "Распечатать\n",
    "Описание\n",
    "\n\n\n",
    "                                        ",
    "\n                        ",
];

/// Any of these means the document is a listing page
const LISTING_MARKERS: [&str; 5] = [
    ".catalog-card",
    ".article-body",
    ".item-status",
    ".price-total",
    "link[rel=canonical]",
];

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("{0} not found")]
    Missing(&'static str),

    #[error("unreadable {what}: {value:?}")]
    Malformed { what: &'static str, value: String },

    #[error("no address layout for {n} parts: {tokens:?}", n = .0.len(), tokens = .0)]
    UnmappedAddress(Vec<String>),
}

pub type Field<T> = Result<T, FieldError>;

fn malformed(what: &'static str, value: impl Into<String>) -> FieldError {
    FieldError::Malformed {
        what,
        value: value.into(),
    }
}

/// Parse raw listing HTML into a record.
pub fn extract_listing(html: &str) -> Option<ListingRecord> {
    extract_record(&Html::parse_document(html))
}

/// Build a record from a listing document.
///
/// Returns `None` only when the document is not a listing page at all.
pub fn extract_record(document: &Html) -> Option<ListingRecord> {
    if let Err(e) = recognize(document) {
        error!("Skipping document: {}", e);
        return None;
    }

    let url = settle("<unknown>", "canonical url", canonical_url(document));
    let listing = url.clone().unwrap_or_else(|| "<unknown>".to_string());
    let id = url
        .as_deref()
        .and_then(|u| settle(&listing, "id", listing_id(u)));

    let available = settle(&listing, "availability", availability(document)).unwrap_or(true);
    let (created, updated) = settle(&listing, "dates", dates(document)).unwrap_or((None, None));
    let create_date = created.and_then(|d| settle(&listing, "create date", d));
    let update_date = updated.and_then(|d| settle(&listing, "update date", d));
    let price = settle(&listing, "price", price(document));

    // Delisted pages carry no contacts.
    let contact_information = if available {
        settle(&listing, "contacts", contacts(document)).unwrap_or_default()
    } else {
        ContactInformation::default()
    };

    let description = settle(&listing, "description", description(document));

    let mut location = settle(&listing, "address", address(document)).unwrap_or_default();
    location.coordinates = settle(&listing, "coordinates", coordinates(document));
    if let Some(name) = description.as_deref().and_then(microdistrict) {
        location.microdistrict = Some(name);
    }

    let areas = settle(&listing, "areas", areas(document)).unwrap_or_default();
    let storeys = settle(&listing, "floors", storeys(document)).unwrap_or_default();

    Some(ListingRecord {
        id,
        url,
        price,
        date: DateInfo {
            create_date,
            update_date,
            available,
        },
        location,
        contact_information,
        apartment_parameters: ApartmentParameters {
            apart_type: settle(&listing, "apartment type", apart_type(document)),
            total_area: areas.total,
            living_area: areas.living,
            kitchen_area: areas.kitchen,
            floor: storeys.floor,
            floors: storeys.floors,
            sale_status: storeys.sale_status,
            description,
            photos: photos(document),
        },
    })
}

/// Unset plus a warning on failure.
fn settle<T>(listing: &str, group: &str, field: Field<T>) -> Option<T> {
    match field {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: could not read {}: {}", listing, group, e);
            None
        }
    }
}

fn recognize(document: &Html) -> Result<(), CrawlError> {
    let is_listing = LISTING_MARKERS
        .iter()
        .any(|marker| document.select(&css(marker)).next().is_some());

    if is_listing {
        Ok(())
    } else {
        let title = document
            .select(&css("title"))
            .next()
            .map(text_of)
            .unwrap_or_default();
        Err(CrawlError::NotAListing(format!("title {:?}", title.trim())))
    }
}

fn first<'a>(document: &'a Html, selector: &'static str) -> Field<ElementRef<'a>> {
    document
        .select(&css(selector))
        .next()
        .ok_or(FieldError::Missing(selector))
}

/// A heading inside the article body marks the listing as delisted.
fn availability(document: &Html) -> Field<bool> {
    let body = first(document, ".article-body")?;
    Ok(body.select(&css("h3")).next().is_none())
}

/// Each labelled line is read on its own, so one bad date keeps the other.
fn dates(document: &Html) -> Field<(Option<Field<String>>, Option<Field<String>>)> {
    let status = first(document, ".item-status")?;

    let mut created = None;
    let mut updated = None;
    for line in status.select(&css("div")) {
        let line = text_of(line);
        let Some((label, value)) = line.trim().split_once(": ") else {
            continue;
        };

        let slot = match label.trim() {
            LABEL_ADDED => &mut created,
            LABEL_UPDATED => &mut updated,
            _ => continue,
        };
        *slot = Some(iso_date(value));
    }

    Ok((created, updated))
}

/// `dd.mm.yyyy` to an ISO-8601 timestamp at midnight UTC.
pub fn iso_date(value: &str) -> Field<String> {
    let date = NaiveDate::parse_from_str(value.trim(), "%d.%m.%Y")
        .map_err(|_| malformed("date", value.trim()))?;
    Ok(date
        .and_time(NaiveTime::MIN)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string())
}

fn price(document: &Html) -> Field<i64> {
    let raw = text_of(first(document, ".price-total")?);
    let digits: String = raw
        .replace(CURRENCY_SUFFIX, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    digits.parse().map_err(|_| malformed("price", raw.trim()))
}

fn canonical_url(document: &Html) -> Field<String> {
    document
        .select(&css("link[rel]"))
        .find(|link| {
            link.value()
                .attr("rel")
                .and_then(|rel| rel.split_whitespace().next())
                .is_some_and(|rel| rel.eq_ignore_ascii_case("canonical"))
        })
        .and_then(|link| link.value().attr("href"))
        .map(absolute_url)
        .ok_or(FieldError::Missing("canonical link"))
}

/// Numeric id between [`ID_TOKEN`] and the next hyphen of a canonical URL.
pub fn listing_id(url: &str) -> Field<i64> {
    let (_, rest) = url
        .split_once(ID_TOKEN)
        .ok_or(FieldError::Missing("listing id token"))?;
    let digits = rest.split('-').next().unwrap_or_default();
    digits.parse().map_err(|_| malformed("listing id", digits))
}

fn contacts(document: &Html) -> Field<ContactInformation> {
    let card = first(document, ".list-contact.vcard")?;
    let label_sel = css("label");
    let strong_sel = css("strong");
    let script_sel = css("script");

    let strong = |block: ElementRef<'_>| {
        block
            .select(&strong_sel)
            .next()
            .map(|s| text_of(s).trim().to_string())
    };

    let mut info = ContactInformation::default();
    for block in card.select(&css("div")) {
        let Some(label) = block.select(&label_sel).next() else {
            continue;
        };

        match text_of(label).trim() {
            LABEL_CONTACT => info.contact = strong(block),
            LABEL_COMPANY => info.company = strong(block),
            LABEL_PHONES | LABEL_PHONE => {
                let script = block
                    .select(&script_sel)
                    .next()
                    .ok_or(FieldError::Missing("phone script"))?;
                info.phone = Some(phone_numbers(&text_of(script)));
            }
            _ => {}
        }
    }

    Ok(info)
}

/// Numbers behind `tel:` links in the script that renders the phone block.
pub fn phone_numbers(script: &str) -> Vec<String> {
    let payload = script
        .split_once("html('")
        .map_or(script, |(_, rest)| rest);
    let payload = payload.split("<p>").next().unwrap_or(payload);

    payload
        .split("tel:")
        .skip(1)
        .filter_map(|chunk| chunk.split(['"', '\'']).next())
        .map(str::trim)
        .filter(|number| !number.is_empty())
        .map(String::from)
        .collect()
}

fn address(document: &Html) -> Field<Location> {
    let raw = text_of(first(document, ".street-address")?);
    let raw = raw.trim();
    let raw = raw.strip_prefix(ADDRESS_PREFIX).unwrap_or(raw);

    let tokens: Vec<&str> = raw.split(", ").collect();
    location_from_tokens(&tokens)
        .ok_or_else(|| FieldError::UnmappedAddress(tokens.iter().map(|t| t.to_string()).collect()))
}

/// Positional address layouts, keyed by the number of comma-separated parts.
pub fn location_from_tokens(tokens: &[&str]) -> Option<Location> {
    let part = |i: usize| Some(tokens[i].trim().to_string());

    let location = match tokens.len() {
        2 => Location {
            region: part(0),
            city: part(1),
            ..Location::default()
        },
        3 => Location {
            region: part(0),
            city: part(1),
            street: part(2),
            ..Location::default()
        },
        4 => Location {
            region: part(0),
            city: part(1),
            street: part(2),
            building_number: part(3),
            ..Location::default()
        },
        5 => Location {
            region: part(0),
            city: part(1),
            district: part(2),
            street: part(3),
            building_number: part(4),
            ..Location::default()
        },
        6 => Location {
            region: part(0),
            city: part(1),
            district: part(2),
            microdistrict: part(3),
            street: part(4),
            building_number: part(5),
            ..Location::default()
        },
        // parts 1 and 4 are administrative subdivisions the record has no slot for
        7 => Location {
            region: part(0),
            city: part(2),
            district: part(3),
            street: part(5),
            building_number: part(6),
            ..Location::default()
        },
        _ => return None,
    };

    Some(location)
}

fn coordinates(document: &Html) -> Field<Coordinates> {
    let notice = first(document, ".article-notice")?;
    let script = notice
        .select(&css("script"))
        .last()
        .ok_or(FieldError::Missing("map script"))?;

    let text = text_of(script);
    let (_, rest) = text
        .split_once("coords = ")
        .ok_or(FieldError::Missing("coords assignment"))?;
    let raw = rest.lines().next().unwrap_or_default();

    parse_coordinates(raw.trim().trim_end_matches([',', ';']))
}

/// `false` or a `[lon, lat]` pair, returned as `[lat, lon]`.
pub fn parse_coordinates(raw: &str) -> Field<Coordinates> {
    if raw == ABSENT_COORDINATES {
        return Ok(Coordinates::Absent);
    }

    let inner = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(|| malformed("coordinates", raw))?;

    let values = inner
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed("coordinates", raw))?;

    match values.as_slice() {
        [lon, lat] => Ok(Coordinates::Point([*lat, *lon])),
        _ => Err(malformed("coordinates", raw)),
    }
}

/// Second word of the heading, e.g. "2-комнатной" becomes "2-комнатная".
fn apart_type(document: &Html) -> Field<String> {
    let heading = text_of(first(document, ".catalog-card header h1")?);
    let word = heading
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| malformed("heading", heading.trim()))?;

    Ok(match word.strip_suffix("ой") {
        Some(stem) => format!("{}ая", stem),
        None => word.to_string(),
    })
}

#[derive(Debug, Default, PartialEq)]
struct Areas {
    total: Option<f64>,
    living: Option<f64>,
    kitchen: Option<f64>,
}

fn areas(document: &Html) -> Field<Areas> {
    let table = first(document, ".desc-list .item-space")?;
    let title_sel = css("thead th");
    let value_sel = css("tbody td");
    let titles = table.select(&title_sel).map(text_of);
    let values = table.select(&value_sel).map(text_of);

    let mut areas = Areas::default();
    for (title, value) in titles.zip(values) {
        let slot = match title.trim() {
            AREA_TOTAL => &mut areas.total,
            AREA_LIVING => &mut areas.living,
            AREA_KITCHEN => &mut areas.kitchen,
            _ => continue,
        };
        *slot = Some(parse_area(&value)?);
    }

    Ok(areas)
}

fn parse_area(value: &str) -> Field<f64> {
    value
        .replace(AREA_UNIT, "")
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| malformed("area", value.trim()))
}

#[derive(Debug, Default, PartialEq)]
struct Storeys {
    floor: Option<i32>,
    floors: Option<i32>,
    sale_status: Option<String>,
}

fn storeys(document: &Html) -> Field<Storeys> {
    let list = first(document, ".desc-list ul")?;

    let mut storeys = Storeys::default();
    for item in list.select(&css("li")) {
        let text = text_of(item);
        let text = text.trim();

        if let Some((current, rest)) = text.split_once(FLOOR_MARKER) {
            storeys.floor = Some(
                current
                    .trim()
                    .parse()
                    .map_err(|_| malformed("floor", text))?,
            );

            let total: String = rest
                .replace(FLOORS_SUFFIX, "")
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if !total.is_empty() {
                storeys.floors = Some(total.parse().map_err(|_| malformed("floors", text))?);
            }
        }

        if let Some((_, status)) = text.split_once(SALE_STATUS_MARKER) {
            storeys.sale_status = Some(status.trim().to_string());
        }
    }

    Ok(storeys)
}

fn description(document: &Html) -> Field<String> {
    let raw = text_of(first(document, ".item-desc")?);
    Ok(DESCRIPTION_BOILERPLATE
        .iter()
        .fold(raw, |text, junk| text.replace(junk, "")))
}

/// Microdistrict named in the description, if the text mentions one.
pub fn microdistrict(description: &str) -> Option<String> {
    if !description.contains(MICRODISTRICT_MARKER) {
        return None;
    }

    let flat = description.replace('\n', "");
    let head = flat.trim().split("br /").next().unwrap_or_default();
    let mut name = head
        .rsplit(MICRODISTRICT_PREFIX)
        .next()
        .unwrap_or_default()
        .to_string();
    // drops the "<" left over from the line break
    name.pop();

    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `None` without a gallery, otherwise every linked image (possibly none).
fn photos(document: &Html) -> Option<Vec<String>> {
    let gallery = document.select(&css(".gallery-slider")).next()?;
    Some(
        gallery
            .select(&css("a[href]"))
            .filter_map(|a| a.value().attr("href"))
            .map(absolute_url)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r##"<!DOCTYPE html>
<html>
<head>
    <title>Продажа 4-комнатной квартиры</title>
    <link rel="stylesheet" href="//cdn.realty.test/site.css">
    <link rel="canonical" href="//ekaterinburg.russianrealty.ru/prodazha-kvartiry-418469505-4-komnatnaya-Ekaterinburg-ulitsa-Hohryakova/">
</head>
<body>
<div class="catalog-card">
    <header><h1>Продажа 4-комнатной квартиры, 98 м²</h1></header>
    <div class="article-body"><p>Актуальное объявление</p></div>
    <div class="item-status">
        <div>Добавлено: 05.11.2023</div>
        <div>Обновлено: 21.12.2023</div>
        <div>Просмотров: 120</div>
    </div>
    <div class="price-total">8 950 000 руб.</div>
    <div class="street-address">Адрес: Свердловская область, Екатеринбург, Ленинский, ЖБИ, улица Хохрякова, 10</div>
    <div class="article-notice">
        <script>var counter = 1;</script>
        <script>
            var map;
            coords = [60.597465,56.838011],
                zoom = 16;
        </script>
    </div>
    <div class="col-lg-4 col-md-6 col-sm-12 desc-list">
        <table class="item-space">
            <thead><tr><th>Общая</th><th>Жилая</th><th>Кухня</th></tr></thead>
            <tbody><tr><td>98.5 м²</td><td>60 м²</td><td>12,3 м²</td></tr></tbody>
        </table>
        <ul>
            <li>5 этаж 9-этажного дома</li>
            <li>Статус продажи: свободная продажа</li>
        </ul>
    </div>
    <div class="list-contact vcard">
        <div><label>Контакт:</label> <strong>Иван</strong></div>
        <div><label>Компания:</label> <strong>АН Дом</strong></div>
        <div><label>Телефоны:</label><script>$('#phones').html('<a href="tel:+79001234567">+7 900 123-45-67</a><a href="tel:+73432000000">+7 343 200-00-00</a><p>Скажите, что нашли на сайте</p>');</script></div>
    </div>
    <div class="item-desc">Распечатать
Описание
Продается квартира, %MICRO%Юго-Западный&lt;br /&gt;Рядом школа и парк.</div>
    <div class="gallery-slider">
        <a href="//img.realty.test/1.jpg"><img src="//img.realty.test/1s.jpg"></a>
        <a href="//img.realty.test/2.jpg"><img src="//img.realty.test/2s.jpg"></a>
    </div>
</div>
</body>
</html>"##;

    fn fixture() -> String {
        LISTING.replace("%MICRO%", MICRODISTRICT_PREFIX)
    }

    #[test]
    fn extracts_full_listing() {
        let record = extract_listing(&fixture()).unwrap();

        assert_eq!(record.id, Some(418469505));
        assert_eq!(
            record.url.as_deref(),
            Some("https://ekaterinburg.russianrealty.ru/prodazha-kvartiry-418469505-4-komnatnaya-Ekaterinburg-ulitsa-Hohryakova/")
        );
        assert_eq!(record.price, Some(8_950_000));

        assert!(record.date.available);
        assert_eq!(record.date.create_date.as_deref(), Some("2023-11-05T00:00:00Z"));
        assert_eq!(record.date.update_date.as_deref(), Some("2023-12-21T00:00:00Z"));

        let loc = &record.location;
        assert_eq!(loc.region.as_deref(), Some("Свердловская область"));
        assert_eq!(loc.city.as_deref(), Some("Екатеринбург"));
        assert_eq!(loc.district.as_deref(), Some("Ленинский"));
        assert_eq!(loc.street.as_deref(), Some("улица Хохрякова"));
        assert_eq!(loc.building_number.as_deref(), Some("10"));
        // description mention wins over the address part
        assert_eq!(loc.microdistrict.as_deref(), Some("Юго-Западный"));
        assert_eq!(loc.coordinates, Some(Coordinates::Point([56.838011, 60.597465])));

        let contacts = &record.contact_information;
        assert_eq!(contacts.contact.as_deref(), Some("Иван"));
        assert_eq!(contacts.company.as_deref(), Some("АН Дом"));
        assert_eq!(
            contacts.phone,
            Some(vec!["+79001234567".to_string(), "+73432000000".to_string()])
        );

        let params = &record.apartment_parameters;
        assert_eq!(params.apart_type.as_deref(), Some("4-комнатная"));
        assert_eq!(params.total_area, Some(98.5));
        assert_eq!(params.living_area, Some(60.0));
        assert_eq!(params.kitchen_area, Some(12.3));
        assert_eq!(params.floor, Some(5));
        assert_eq!(params.floors, Some(9));
        assert_eq!(params.sale_status.as_deref(), Some("свободная продажа"));
        assert!(params
            .description
            .as_deref()
            .unwrap()
            .starts_with("Продается квартира"));
        assert_eq!(
            params.photos,
            Some(vec![
                "https://img.realty.test/1.jpg".to_string(),
                "https://img.realty.test/2.jpg".to_string(),
            ])
        );
    }

    #[test]
    fn missing_price_leaves_everything_else() {
        let html = fixture().replace(r#"<div class="price-total">8 950 000 руб.</div>"#, "");
        let full = extract_listing(&fixture()).unwrap();
        let record = extract_listing(&html).unwrap();

        assert_eq!(record.price, None);
        assert_eq!(
            ListingRecord {
                price: full.price,
                ..record
            },
            full
        );
    }

    #[test]
    fn delisted_listing_has_no_contacts() {
        let html = fixture().replace(
            "<p>Актуальное объявление</p>",
            "<h3>Объявление снято с публикации</h3>",
        );
        let record = extract_listing(&html).unwrap();

        assert!(!record.date.available);
        assert_eq!(record.contact_information, ContactInformation::default());
        assert_eq!(record.price, Some(8_950_000));
    }

    #[test]
    fn missing_article_body_keeps_listing_available() {
        let html = fixture().replace(
            r#"<div class="article-body"><p>Актуальное объявление</p></div>"#,
            "",
        );
        let record = extract_listing(&html).unwrap();
        assert!(record.date.available);
        assert!(record.contact_information.phone.is_some());
    }

    #[test]
    fn gallery_absent_versus_empty() {
        let start = LISTING.find(r#"<div class="gallery-slider">"#).unwrap();
        let end = start + LISTING[start..].find("</div>").unwrap() + "</div>".len();

        let without = fixture().replace(&LISTING[start..end], "");
        assert_eq!(extract_listing(&without).unwrap().apartment_parameters.photos, None);

        let empty = fixture().replace(&LISTING[start..end], r#"<div class="gallery-slider"></div>"#);
        assert_eq!(
            extract_listing(&empty).unwrap().apartment_parameters.photos,
            Some(vec![])
        );
    }

    #[test]
    fn bare_listing_keeps_url_and_id() {
        let html = r#"<html><head><link rel="canonical" href="//realty.test/prodazha-kvartiry-77-1-komnatnaya/"></head><body></body></html>"#;
        let record = extract_listing(html).unwrap();

        assert_eq!(record.id, Some(77));
        assert_eq!(record.url.as_deref(), Some("https://realty.test/prodazha-kvartiry-77-1-komnatnaya/"));
        assert_eq!(record.price, None);
        assert!(record.date.available);
        assert_eq!(record.location, Location::default());
        assert_eq!(record.apartment_parameters, ApartmentParameters::default());
    }

    #[test]
    fn non_listing_document_is_dropped() {
        assert!(extract_listing("<html><head><title>404</title></head><body><p>Not found</p></body></html>").is_none());
    }

    #[test]
    fn id_from_canonical_url() {
        assert_eq!(
            listing_id("https://host/prodazha-kvartiry-418469505-4-komnatnaya-Ekaterinburg/"),
            Ok(418469505)
        );
        assert_eq!(listing_id("https://host/prodazha-doma-5/"), Err(FieldError::Missing("listing id token")));
        assert!(matches!(
            listing_id("https://host/kvartiry-abc-1/"),
            Err(FieldError::Malformed { .. })
        ));
    }

    #[test]
    fn address_layouts_by_part_count() {
        let parts = ["p0", "p1", "p2", "p3", "p4", "p5", "p6", "p7"];
        let s = |v: &str| Some(v.to_string());

        assert_eq!(location_from_tokens(&parts[..1]), None);
        assert_eq!(location_from_tokens(&parts[..8]), None);

        assert_eq!(
            location_from_tokens(&parts[..2]),
            Some(Location { region: s("p0"), city: s("p1"), ..Location::default() })
        );
        assert_eq!(
            location_from_tokens(&parts[..3]),
            Some(Location { region: s("p0"), city: s("p1"), street: s("p2"), ..Location::default() })
        );
        assert_eq!(
            location_from_tokens(&parts[..4]),
            Some(Location {
                region: s("p0"),
                city: s("p1"),
                street: s("p2"),
                building_number: s("p3"),
                ..Location::default()
            })
        );
        assert_eq!(
            location_from_tokens(&parts[..5]),
            Some(Location {
                region: s("p0"),
                city: s("p1"),
                district: s("p2"),
                street: s("p3"),
                building_number: s("p4"),
                ..Location::default()
            })
        );
        assert_eq!(
            location_from_tokens(&parts[..6]),
            Some(Location {
                region: s("p0"),
                city: s("p1"),
                district: s("p2"),
                microdistrict: s("p3"),
                street: s("p4"),
                building_number: s("p5"),
                ..Location::default()
            })
        );
        assert_eq!(
            location_from_tokens(&parts[..7]),
            Some(Location {
                region: s("p0"),
                city: s("p2"),
                district: s("p3"),
                street: s("p5"),
                building_number: s("p6"),
                ..Location::default()
            })
        );
    }

    #[test]
    fn unmapped_address_leaves_location_unset() {
        let html = fixture().replace(
            "Адрес: Свердловская область, Екатеринбург, Ленинский, ЖБИ, улица Хохрякова, 10",
            "Адрес: Екатеринбург",
        );
        let record = extract_listing(&html).unwrap();

        assert_eq!(record.location.region, None);
        assert_eq!(record.location.city, None);
        // independent groups still land
        assert!(record.location.coordinates.is_some());
        assert_eq!(record.location.microdistrict.as_deref(), Some("Юго-Западный"));
    }

    #[test]
    fn coordinates_false_is_kept_as_absent() {
        assert_eq!(parse_coordinates("false"), Ok(Coordinates::Absent));
        assert_eq!(
            parse_coordinates("[60.5, 56.8]"),
            Ok(Coordinates::Point([56.8, 60.5]))
        );
        assert!(parse_coordinates("[60.5]").is_err());
        assert!(parse_coordinates("null").is_err());

        let html = fixture().replace("coords = [60.597465,56.838011],", "coords = false,");
        let record = extract_listing(&html).unwrap();
        assert_eq!(record.location.coordinates, Some(Coordinates::Absent));
    }

    #[test]
    fn phone_numbers_from_script() {
        let script = r#"$('#p').html('<a href="tel:+7 900 1">a</a><a href='tel:83430'>b</a><p>x<a href="tel:999">c</a>');"#;
        assert_eq!(phone_numbers(script), vec!["+7 900 1", "83430"]);
        assert!(phone_numbers("no phones").is_empty());
    }

    #[test]
    fn single_phone_label() {
        let html = fixture().replace("Телефоны:", "Телефон:");
        let record = extract_listing(&html).unwrap();
        assert_eq!(record.contact_information.phone.map(|p| p.len()), Some(2));
    }

    #[test]
    fn unknown_date_labels_are_ignored() {
        let html = fixture().replace("Обновлено: 21.12.2023", "Продлено: 21.12.2023");
        let record = extract_listing(&html).unwrap();
        assert_eq!(record.date.create_date.as_deref(), Some("2023-11-05T00:00:00Z"));
        assert_eq!(record.date.update_date, None);
    }

    #[test]
    fn malformed_update_date_keeps_create_date() {
        let html = fixture().replace("Обновлено: 21.12.2023", "Обновлено: вчера");
        let record = extract_listing(&html).unwrap();
        assert_eq!(record.date.create_date.as_deref(), Some("2023-11-05T00:00:00Z"));
        assert_eq!(record.date.update_date, None);
    }

    #[test]
    fn date_normalization() {
        assert_eq!(iso_date("01.02.2024").as_deref(), Ok("2024-02-01T00:00:00Z"));
        assert!(iso_date("2024-02-01").is_err());
    }

    #[test]
    fn floor_without_building_height() {
        let html = fixture().replace("5 этаж 9-этажного дома", "2 этаж");
        let params = extract_listing(&html).unwrap().apartment_parameters;
        assert_eq!(params.floor, Some(2));
        assert_eq!(params.floors, None);
        assert_eq!(params.sale_status.as_deref(), Some("свободная продажа"));
    }

    #[test]
    fn description_without_marker_keeps_address_microdistrict() {
        let html = fixture().replace(MICRODISTRICT_PREFIX, "район ");
        let record = extract_listing(&html).unwrap();
        assert_eq!(record.location.microdistrict.as_deref(), Some("ЖБИ"));
    }

    #[test]
    fn microdistrict_from_text() {
        let text = format!("Квартира, {}Академический<br />Школа рядом.", MICRODISTRICT_PREFIX);
        assert_eq!(microdistrict(&text).as_deref(), Some("Академический"));
        assert_eq!(microdistrict("Обычный текст"), None);
    }

    #[test]
    fn plain_cyrillic_spelling_is_not_the_marker() {
        assert_eq!(microdistrict("в микрорайоне Пионерский"), None);
    }
}
