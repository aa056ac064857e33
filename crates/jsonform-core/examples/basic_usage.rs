//! Resolves a form configuration from a page query string.
//!
//! Run with: `cargo run -p jsonform-core --example basic_usage`

use jsonform_core::Result;
use jsonform_core::prelude::*;

fn main() -> Result<()> {
    let query = parse_query(
        "title=Edit%20user&schemaName=user&valueUrl=/user/1.json&submitUrl=/user/1.json&submitMethod=PUT&successStatus=204",
    );
    let resolved = FormParams::from_query_strict(&query)?.resolve()?;

    println!("Title:   {}", resolved.title.as_deref().unwrap_or("-"));
    println!("Schema:  {}", resolved.schema.label());
    println!("Submit:  {} {}", resolved.submit_method, resolved.submit_url);
    println!("Success: {}", resolved.success_status);

    for status in [200, 204] {
        println!("{status} -> {:?}", resolved.success_status.check(status));
    }

    Ok(())
}
