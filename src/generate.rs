//! Seeded synthetic sales data for demos and tests

use chrono::{Duration, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::SalesRecord;

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const GENDER_WEIGHTS: [u32; 3] = [48, 50, 2];
const NATIONALITIES: [&str; 8] = [
    "UAE",
    "India",
    "Philippines",
    "Egypt",
    "Pakistan",
    "UK",
    "Saudi Arabia",
    "Other",
];
const LOCATIONS: [&str; 5] = ["Abu Dhabi", "Dubai", "Sharjah", "Ajman", "Ras Al Khaimah"];
const LOYALTY_TIERS: [&str; 4] = ["None", "Silver", "Gold", "Platinum"];
const TIER_WEIGHTS: [u32; 4] = [50, 25, 18, 7];
const PAYMENT_TYPES: [&str; 3] = ["Cash", "Card", "Mobile Pay"];
const PAYMENT_WEIGHTS: [u32; 3] = [25, 65, 10];

/// Category name, selection weight and unit price range in AED
const CATEGORIES: [(&str, u32, f64, f64); 5] = [
    ("Clothing", 20, 40.0, 200.0),
    ("Grocery", 45, 10.0, 60.0),
    ("Electronics", 15, 300.0, 1400.0),
    ("Home & Living", 12, 80.0, 380.0),
    ("Pharmacy", 8, 10.0, 75.0),
];

/// Days of history covered by generated data
pub const HISTORY_DAYS: i64 = 180;

/// Options for demo data generation
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub rows: usize,
    pub seed: u64,
    /// Last day of the generated history
    pub end_date: NaiveDate,
}

struct Demographics {
    age: u32,
    gender: &'static str,
    nationality: &'static str,
    location: &'static str,
    loyalty_tier: &'static str,
}

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str], weights: &WeightedIndex<u32>) -> &'a str {
    items[weights.sample(rng)]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generate `rows` transactions spread over the history window ending at `end_date`.
///
/// Roughly `max(10, 0.6 * rows)` customers share the transactions; each keeps
/// the same demographics across purchases. The same seed always yields the
/// same records.
pub fn generate_sales(options: &DemoOptions) -> crate::Result<Vec<SalesRecord>> {
    let mut rng = StdRng::seed_from_u64(options.seed);

    let gender_dist = WeightedIndex::new(GENDER_WEIGHTS)?;
    let tier_dist = WeightedIndex::new(TIER_WEIGHTS)?;
    let payment_dist = WeightedIndex::new(PAYMENT_WEIGHTS)?;
    let category_dist = WeightedIndex::new(CATEGORIES.iter().map(|c| c.1))?;
    // Mostly one or two items per basket
    let quantity_dist = WeightedIndex::new([40u32, 27, 18, 9, 4, 2])?;

    let customer_count = ((options.rows as f64 * 0.6) as usize).max(10);
    let demographics: Vec<Demographics> = (0..customer_count)
        .map(|_| Demographics {
            age: rng.gen_range(16..=75),
            gender: pick(&mut rng, &GENDERS, &gender_dist),
            nationality: NATIONALITIES[rng.gen_range(0..NATIONALITIES.len())],
            location: LOCATIONS[rng.gen_range(0..LOCATIONS.len())],
            loyalty_tier: pick(&mut rng, &LOYALTY_TIERS, &tier_dist),
        })
        .collect();

    let start = options.end_date - Duration::days(HISTORY_DAYS);
    let mut records = Vec::with_capacity(options.rows);
    for i in 0..options.rows {
        let customer = rng.gen_range(0..customer_count);
        let demo = &demographics[customer];
        let date = start + Duration::days(rng.gen_range(0..=HISTORY_DAYS));

        let (category, _, low, high) = CATEGORIES[category_dist.sample(&mut rng)];
        let unit_price = rng.gen_range(low..high);
        let quantity = quantity_dist.sample(&mut rng) as u32 + 1;
        let amount = round2(unit_price * quantity as f64 * rng.gen_range(0.7..1.4)).max(2.0);

        records.push(SalesRecord {
            transaction_id: format!("T{}", 10000 + i),
            timestamp: date.and_time(chrono::NaiveTime::MIN),
            customer_id: format!("C{}", 1000 + customer),
            age: Some(demo.age),
            gender: Some(demo.gender.to_string()),
            nationality: Some(demo.nationality.to_string()),
            location: Some(demo.location.to_string()),
            loyalty_tier: Some(demo.loyalty_tier.to_string()),
            category: Some(category.to_string()),
            quantity: Some(quantity),
            amount,
            payment_type: Some(pick(&mut rng, &PAYMENT_TYPES, &payment_dist).to_string()),
        });
    }

    records.sort_by_key(|r| r.timestamp);
    tracing::debug!(
        rows = records.len(),
        customers = customer_count,
        seed = options.seed,
        "generated demo sales"
    );
    Ok(records)
}
