//! Tag numbering against a live database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

mod common;

use anyhow::Result;
use common::{acquire_db_lock, new_asset, TestContext};
use inventory_server::{error::AppError, inventory::tag::AssetTag};

#[tokio::test]
#[ignore]
async fn sequence_is_shared_across_categories_of_an_office() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;

    let main_office = ctx.location("Main office", Some("m")).await?;
    let paris = ctx.location("Paris", Some("P")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let other = ctx.category("Other", Some("othr")).await?;

    let assets = &ctx.services.assets;
    let a = assets.create_in_year(new_asset("Laptop 1", &main_office, &computers), 2025, None).await?;
    let b = assets.create_in_year(new_asset("Laptop 2", &main_office, &computers), 2025, None).await?;
    let c = assets.create_in_year(new_asset("Projector", &main_office, &other), 2025, None).await?;
    let d = assets.create_in_year(new_asset("Laptop 3", &paris, &computers), 2025, None).await?;

    assert_eq!(a.asset_tag, "ESS-M-COMP-2025-0001");
    assert_eq!(b.asset_tag, "ESS-M-COMP-2025-0002");
    assert_eq!(c.asset_tag, "ESS-M-OTHR-2025-0003");
    assert_eq!(d.asset_tag, "ESS-P-COMP-2025-0001");

    // A new year starts a new counter
    let e = assets.create_in_year(new_asset("Laptop 4", &main_office, &computers), 2026, None).await?;
    assert_eq!(e.asset_tag, "ESS-M-COMP-2026-0001");

    let counters = ctx.services.tags.counters().await?;
    let m_2025 = counters
        .iter()
        .find(|c| c.office_code == "M" && c.year == 2025)
        .expect("counter for M/2025");
    assert_eq!(m_2025.last_seq, 3);
    assert!(m_2025.verified_at.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn concurrent_creates_receive_distinct_gap_free_numbers() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;

    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;

    const N: usize = 12;
    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let services = ctx.services.clone();
        let request = new_asset(&format!("Laptop {}", i), &office, &computers);
        handles.push(tokio::spawn(async move {
            services.assets.create_in_year(request, 2025, None).await
        }));
    }

    let mut seqs = Vec::with_capacity(N);
    for handle in handles {
        let asset = handle.await??;
        let tag = AssetTag::parse(&asset.asset_tag).expect("minted tag parses");
        assert_eq!(tag.office, "M");
        seqs.push(tag.seq);
    }
    seqs.sort_unstable();

    let expected: Vec<i32> = (1..=N as i32).collect();
    assert_eq!(seqs, expected);
    assert_eq!(ctx.asset_count().await?, N as i64);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn deleted_numbers_are_never_reissued() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;

    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;

    assets.create_in_year(new_asset("Laptop 1", &office, &computers), 2025, None).await?;
    let second = assets.create_in_year(new_asset("Laptop 2", &office, &computers), 2025, None).await?;
    assets.delete(second.id).await?;

    let third = assets.create_in_year(new_asset("Laptop 3", &office, &computers), 2025, None).await?;
    assert_eq!(third.asset_tag, "ESS-M-COMP-2025-0003");
    Ok(())
}

#[tokio::test]
#[ignore]
async fn missing_codes_fail_without_consuming_a_number() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;

    let office = ctx.location("Main office", Some("M")).await?;
    let uncoded_office = ctx.location("Warehouse", None).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let uncoded_category = ctx.category("Misc", Some("   ")).await?;
    let assets = &ctx.services.assets;

    let err = assets
        .create_in_year(new_asset("Laptop", &uncoded_office, &computers), 2025, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("Location")), "{:?}", err);

    let err = assets
        .create_in_year(new_asset("Cable", &office, &uncoded_category), 2025, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("Category")), "{:?}", err);

    assert_eq!(ctx.asset_count().await?, 0);
    assert!(ctx.services.tags.counters().await?.is_empty());

    let first = assets.create_in_year(new_asset("Laptop", &office, &computers), 2025, None).await?;
    assert_eq!(first.asset_tag, "ESS-M-COMP-2025-0001");
    Ok(())
}

#[tokio::test]
#[ignore]
async fn counter_catches_up_with_tags_it_did_not_issue() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;

    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;

    // Rows written before counters existed
    for tag in ["ESS-M-COMP-2024-0007", "ESS-M-MONI-2024-0011", "ESS-M-COMP-2024-garbage"] {
        sqlx::query(
            "INSERT INTO assets (asset_tag, name, status, category_id, location_id) \
             VALUES ($1, 'legacy', 'in_stock', $2, $3)",
        )
        .bind(tag)
        .bind(computers.id)
        .bind(office.id)
        .execute(&ctx.pool)
        .await?;
    }

    let next = ctx
        .services
        .assets
        .create_in_year(new_asset("Laptop", &office, &computers), 2024, None)
        .await?;
    assert_eq!(next.asset_tag, "ESS-M-COMP-2024-0012");

    // Explicit tags from an import raise the counter too
    let csv = "asset_tag,name,status,category_code,location_code\n\
               ESS-M-COMP-2024-0040,Imported laptop,in_stock,COMP,M\n";
    let report = ctx.services.transfer.import_csv(csv, None).await?;
    assert_eq!(report.kept_tags, vec!["ESS-M-COMP-2024-0040".to_string()]);

    let after_import = ctx
        .services
        .assets
        .create_in_year(new_asset("Laptop", &office, &computers), 2024, None)
        .await?;
    assert_eq!(after_import.asset_tag, "ESS-M-COMP-2024-0041");
    Ok(())
}

#[tokio::test]
#[ignore]
async fn dashed_codes_never_reach_a_tag() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;

    let err = ctx.category("IT equipment", Some("it-eq")).await.unwrap_err();
    let err = err.downcast::<AppError>()?;
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("IT-EQ")), "{:?}", err);

    let err = ctx.location("Main office", Some("M-1")).await.unwrap_err();
    assert!(matches!(err.downcast::<AppError>()?, AppError::Validation(_)));

    ctx.location("Main office", Some("M")).await?;
    ctx.category("IT equipment", Some("ITEQ")).await?;

    // Would read back as office M-IT and leave the M counter unprotected
    let csv = "asset_tag,name,status,category_code,location_code\n\
               ESS-M-IT-EQ-2025-0040,Switch,in_stock,ITEQ,M\n";
    let err = ctx.services.transfer.import_csv(csv, None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.starts_with("Row 1")), "{:?}", err);
    assert_eq!(ctx.asset_count().await?, 0);
    assert!(ctx.services.tags.counters().await?.is_empty());
    Ok(())
}
