//! `pricewalk normalize <PRICE> [QUANTITY]`: run the normalizer once.

use crate::cli::output;
use crate::pricing;
use anyhow::Result;

pub fn run(price: &str, quantity: &str, name: &str) -> Result<()> {
    let unit_price = pricing::normalize(price, quantity, name);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "price": price,
            "quantity": quantity,
            "name": name,
            "base_unit_price": unit_price.formatted(),
            "base_unit": unit_price.unit,
        }));
    } else {
        println!("{} per {}", unit_price.formatted(), unit_price.unit);
    }
    Ok(())
}
