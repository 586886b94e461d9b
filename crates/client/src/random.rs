//! Randomized field values for payload drafts.
//!
//! Generators only promise syntactically valid values.

use chrono::{Duration, Local, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

/// Cargo place packaging types accepted by the API.
pub const CARGO_TYPES: [&str; 3] = ["pallet", "box", "bag"];

/// Shipment task packaging types.
pub const PACKAGE_TYPES: [&str; 6] = ["box", "pallet", "container", "bag", "RP", "vehicleBody"];

/// Shipment task carriers.
pub const SHIP_BY: [&str; 3] = ["fm_logistic", "vezubr", "pochta"];

const PRODUCT_NAMES: [&str; 8] = [
    "Office paper",
    "Cardboard",
    "Electronics",
    "Clothing",
    "Furniture",
    "Building materials",
    "Pharmaceuticals",
    "Groceries",
];

const SURNAMES: [&str; 6] = ["Иванов", "Петров", "Смирнов", "Кузнецов", "Попов", "Соколов"];

const FIRST_NAMES: [&str; 6] = ["Иван", "Пётр", "Алексей", "Дмитрий", "Сергей", "Николай"];

const PATRONYMICS: [&str; 5] = [
    "Иванович",
    "Петрович",
    "Алексеевич",
    "Дмитриевич",
    "Сергеевич",
];

const PHONE_AREA_CODES: [&str; 6] = ["909", "908", "907", "906", "905", "904"];

/// Cyrillic letters that also exist in the Latin alphabet; the only ones
/// allowed on Russian plates.
const PLATE_LETTERS: [char; 12] = ['А', 'В', 'Е', 'К', 'М', 'Н', 'О', 'Р', 'С', 'Т', 'У', 'Х'];

/// First 8 hex digits of a fresh UUID, upper-cased.
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// Invoice number such as `INV-1A2B3C4D`.
pub fn invoice_number() -> String {
    format!("INV-{}", short_id())
}

/// External id with a caller-chosen prefix, such as `CP-TEST-1A2B3C4D`.
pub fn external_id(prefix: &str) -> String {
    format!("{prefix}-{}", short_id())
}

/// Address external id such as `Izhevsk 42-917`.
pub fn address_external_id() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "Izhevsk {}-{}",
        rng.gen_range(1..=100),
        rng.gen_range(1..=1000)
    )
}

/// One of [`CARGO_TYPES`].
pub fn cargo_type() -> &'static str {
    CARGO_TYPES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("box")
}

/// Inclusive random integer.
pub fn int_between(low: i64, high: i64) -> i64 {
    rand::thread_rng().gen_range(low..=high)
}

/// Shipment task number such as `12-345-6789`.
pub fn task_number() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{:02}-{:03}-{}",
        rng.gen_range(10..=99),
        rng.gen_range(0..=999),
        rng.gen_range(1000..=9999)
    )
}

/// Product title for shipment tasks.
pub fn product_name() -> &'static str {
    PRODUCT_NAMES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Cardboard")
}

/// Lowercase word of 6 to 8 letters for `externalTaskNumber`.
pub fn external_task_number() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(6..=8);
    (0..len).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect()
}

/// One of [`PACKAGE_TYPES`].
pub fn package_type() -> &'static str {
    PACKAGE_TYPES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("box")
}

/// One of [`SHIP_BY`].
pub fn ship_by() -> &'static str {
    SHIP_BY
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("vezubr")
}

/// Local date `days` from today, `YYYY-MM-DD`.
pub fn local_date_in(days: i64) -> String {
    (Local::now() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Local date-time `days` from now, `DD.MM.YYYY HH:MM`.
pub fn local_datetime_in(days: i64) -> String {
    (Local::now() + Duration::days(days))
        .format("%d.%m.%Y %H:%M")
        .to_string()
}

/// UTC timestamp `days` from now with millisecond precision and `Z` suffix.
pub fn utc_timestamp_in(days: i64) -> String {
    (Utc::now() + Duration::days(days))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// One of `choices`, or `default` when there are none.
pub fn pick(choices: &[&'static str], default: &'static str) -> &'static str {
    choices
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(default)
}

/// Male `(surname, name, patronymic)`.
pub fn driver_name() -> (&'static str, &'static str, &'static str) {
    (
        pick(&SURNAMES, "Иванов"),
        pick(&FIRST_NAMES, "Иван"),
        pick(&PATRONYMICS, "Иванович"),
    )
}

/// Mobile number such as `+7 (909) 123-45-67`.
pub fn phone_number() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "+7 ({}) {:03}-{:02}-{:02}",
        pick(&PHONE_AREA_CODES, "909"),
        rng.gen_range(0..=999),
        rng.gen_range(0..=99),
        rng.gen_range(0..=99)
    )
}

/// `count` decimal digits without a leading zero.
pub fn digits(count: u32) -> String {
    let low = 10_i64.pow(count.saturating_sub(1));
    int_between(low, low * 10 - 1).to_string()
}

/// `count` characters from `A-Z0-9`.
pub fn plate_suffix(count: usize) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

/// Russian trailer plate such as `А123ВС77`.
pub fn trailer_plate() -> String {
    let mut rng = rand::thread_rng();
    let letter =
        |rng: &mut rand::rngs::ThreadRng| PLATE_LETTERS[rng.gen_range(0..PLATE_LETTERS.len())];
    format!(
        "{}{:03}{}{}{:02}",
        letter(&mut rng),
        rng.gen_range(0..=999),
        letter(&mut rng),
        letter(&mut rng),
        rng.gen_range(1..=99)
    )
}

/// UTC timestamp `hours` from now, second precision with `Z` suffix.
pub fn utc_seconds_in_hours(hours: i64) -> String {
    (Utc::now() + Duration::hours(hours))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
