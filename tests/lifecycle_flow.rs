//! Lifecycle actions, audit trail and CSV transfer against a live database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

mod common;

use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use common::{acquire_db_lock, new_asset, TestContext};
use rust_decimal::Decimal;

use inventory_server::{
    error::AppError,
    models::{
        asset::{AssignAsset, CompleteRepair, MoveAsset, StartRepair, UpdateAsset},
        category::CreateSubCategory,
        enums::{AssetEventType, AssetStatus},
        import_report::EXPORT_HEADERS,
    },
};

fn assign_to(name: &str) -> AssignAsset {
    AssignAsset {
        assigned_to: name.to_string(),
        assigned_department: None,
        assigned_email: None,
    }
}

#[tokio::test]
#[ignore]
async fn assign_records_event_and_assignee() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;

    let asset = assets.create(new_asset("Laptop", &office, &computers), None).await?;
    let result = assets.assign(asset.id, assign_to("Jane Doe"), None).await?;

    assert!(result.changed);
    assert_eq!(result.asset.status, AssetStatus::Assigned);
    assert_eq!(result.asset.assigned_to.as_deref(), Some("Jane Doe"));
    assert!(result.asset.assigned_at.is_some());

    let event = result.event.expect("assign writes an event");
    assert_eq!(event.event_type, AssetEventType::Assign);
    assert_eq!(event.from_status, Some(AssetStatus::InStock));
    assert_eq!(event.to_status, Some(AssetStatus::Assigned));
    assert!(event.note.unwrap_or_default().starts_with("Assigned to Jane Doe"));

    let history = assets.history(asset.id).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event_type, AssetEventType::Assign);
    assert_eq!(history[1].event_type, AssetEventType::Created);

    let released = assets.unassign(asset.id, None).await?;
    assert_eq!(released.asset.status, AssetStatus::InStock);
    assert!(released.asset.assigned_to.is_none());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn assign_is_refused_outside_stock() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;

    for status in [
        AssetStatus::Disposed,
        AssetStatus::Repair,
        AssetStatus::Missing,
        AssetStatus::Damaged,
    ] {
        let mut request = new_asset("Laptop", &office, &computers);
        request.status = Some(status);
        let asset = assets.create(request, None).await?;

        let err = assets.assign(asset.id, assign_to("Jane Doe"), None).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)), "{:?}: {:?}", status, err);

        let reloaded = assets.get(asset.id).await?;
        assert_eq!(reloaded.status, status);
        assert!(reloaded.assigned_to.is_none());
        assert_eq!(assets.history(asset.id).await?.len(), 1);
    }
    Ok(())
}

#[tokio::test]
#[ignore]
async fn repair_cycle_creates_vendor_and_can_end_in_disposal() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;

    let asset = assets.create(new_asset("Laptop", &office, &computers), None).await?;
    assets.assign(asset.id, assign_to("Jane Doe"), None).await?;

    let started = assets
        .start_repair(
            asset.id,
            StartRepair {
                repair_vendor: Some("Fix-It Ltd".to_string()),
                repair_vendor_phone: Some("+44 20 7946 0000".to_string()),
                repair_vendor_address: Some("1 High Street".to_string()),
                repair_reference: Some("RMA-42".to_string()),
                ..Default::default()
            },
            None,
        )
        .await?;
    assert_eq!(started.asset.status, AssetStatus::Repair);
    assert!(started.asset.assigned_to.is_none());
    assert_eq!(started.asset.repair_vendor.as_deref(), Some("Fix-It Ltd"));
    assert_eq!(started.asset.repair_reference.as_deref(), Some("RMA-42"));

    let vendors = ctx.services.catalog.list_vendors().await?;
    assert_eq!(vendors.len(), 1);
    assert_eq!(vendors[0].contact_phone.as_deref(), Some("+44 20 7946 0000"));

    let completed = assets
        .complete_repair(
            asset.id,
            CompleteRepair {
                outcome: Some("disposed".to_string()),
                repair_cost: Some("150.00".to_string()),
                repair_notes: Some("Board failure".to_string()),
            },
            None,
        )
        .await?;
    assert_eq!(completed.asset.status, AssetStatus::Disposed);
    assert_eq!(completed.asset.repair_cost, Some(Decimal::from_str("150.00")?));
    assert!(completed.asset.repair_closed_at.is_some());

    let history = assets.history(asset.id).await?;
    let types: Vec<AssetEventType> = history.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            AssetEventType::RepairEnd,
            AssetEventType::RepairStart,
            AssetEventType::Assign,
            AssetEventType::Created,
        ]
    );
    Ok(())
}

#[tokio::test]
#[ignore]
async fn unknown_repair_vendor_needs_contact_details() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;

    let asset = assets.create(new_asset("Laptop", &office, &computers), None).await?;
    let err = assets
        .start_repair(
            asset.id,
            StartRepair {
                repair_vendor: Some("Nobody Repairs".to_string()),
                repair_vendor_address: Some("Somewhere".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{:?}", err);

    assert_eq!(assets.get(asset.id).await?.status, AssetStatus::InStock);
    assert!(ctx.services.catalog.list_vendors().await?.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn repeated_actions_are_no_ops() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;

    let asset = assets.create(new_asset("Laptop", &office, &computers), None).await?;

    let first = assets.dispose(asset.id, None).await?;
    assert!(first.changed);
    let second = assets.dispose(asset.id, None).await?;
    assert!(!second.changed);
    assert!(second.event.is_none());
    assert_eq!(assets.history(asset.id).await?.len(), 2);

    // Only assets under repair can complete one
    let err = assets
        .complete_repair(
            asset.id,
            CompleteRepair {
                outcome: None,
                repair_cost: None,
                repair_notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn move_changes_location_but_edit_cannot() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let paris = ctx.location("Paris", Some("P")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;

    let asset = assets.create(new_asset("Laptop", &office, &computers), None).await?;

    let edit = UpdateAsset {
        location_id: Some(paris.id),
        ..Default::default()
    };
    let err = assets.update(asset.id, edit).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)), "{:?}", err);

    let moved = assets
        .move_to(
            asset.id,
            MoveAsset {
                new_location_id: paris.id,
                reason: Some("Office closure".to_string()),
                reference: None,
            },
            None,
        )
        .await?;
    assert_eq!(moved.asset.location_id, Some(paris.id));
    // The tag keeps the office it was minted in
    assert_eq!(moved.asset.asset_tag, asset.asset_tag);

    let event = moved.event.expect("move writes an event");
    assert_eq!(event.from_location_id, Some(office.id));
    assert_eq!(event.to_location_id, Some(paris.id));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn import_is_all_or_nothing() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    ctx.location("Main office", Some("M")).await?;
    ctx.category("Computers", Some("COMP")).await?;

    let csv = "name,status,category_code,location_code\n\
               Laptop,in_stock,COMP,M\n\
               Monitor,in_stock,COMP,NOWHERE\n";
    let err = ctx.services.transfer.import_csv(csv, None).await.unwrap_err();
    match err {
        AppError::Validation(msg) => assert!(msg.contains("Row 2"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ctx.asset_count().await?, 0);
    assert!(ctx.services.tags.counters().await?.iter().all(|c| c.last_seq == 0));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn export_lists_assets_with_codes() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;

    let asset = ctx
        .services
        .assets
        .create(new_asset("Laptop", &office, &computers), None)
        .await?;

    let body = ctx.services.transfer.export_csv().await?;
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some(EXPORT_HEADERS.join(",").as_str()));

    let row = lines.next().expect("one data row");
    assert!(row.starts_with(&format!("{},Laptop,in_stock,COMP,,M,", asset.asset_tag)), "{}", row);
    assert!(lines.next().is_none());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn category_change_drops_foreign_subcategory() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let monitors = ctx.category("Monitors", Some("MONI")).await?;
    let laptops = ctx
        .services
        .catalog
        .create_subcategory(
            computers.id,
            CreateSubCategory {
                name: "Laptops".to_string(),
                description: None,
            },
        )
        .await?;

    let mut request = new_asset("Laptop", &office, &computers);
    request.subcategory_id = Some(laptops.id);
    let asset = ctx.services.assets.create(request, None).await?;
    assert_eq!(asset.subcategory_id, Some(laptops.id));

    let edit = UpdateAsset {
        category_id: Some(monitors.id),
        ..Default::default()
    };
    let updated = ctx.services.assets.update(asset.id, edit).await?;
    assert_eq!(updated.category_id, Some(monitors.id));
    assert_eq!(updated.subcategory_id, None);

    // Renaming alone keeps it
    let mut request = new_asset("Laptop 2", &office, &computers);
    request.subcategory_id = Some(laptops.id);
    let other = ctx.services.assets.create(request, None).await?;
    let edit = UpdateAsset {
        name: Some("Laptop 2b".to_string()),
        ..Default::default()
    };
    let renamed = ctx.services.assets.update(other.id, edit).await?;
    assert_eq!(renamed.subcategory_id, Some(laptops.id));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn dashboard_counts_and_flags_assets() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let ctx = TestContext::new().await?;
    let office = ctx.location("Main office", Some("M")).await?;
    let computers = ctx.category("Computers", Some("COMP")).await?;
    let assets = &ctx.services.assets;
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");

    let healthy = assets.create(new_asset("Healthy", &office, &computers), None).await?;
    assets.assign(healthy.id, assign_to("Jane Doe"), None).await?;

    let mut request = new_asset("Expiring", &office, &computers);
    request.warranty_expiry_date = NaiveDate::from_ymd_opt(2025, 6, 20);
    let expiring = assets.create(request, None).await?;

    let mut request = new_asset("Expired", &office, &computers);
    request.warranty_expiry_date = NaiveDate::from_ymd_opt(2025, 5, 1);
    let expired = assets.create(request, None).await?;

    let mut request = new_asset("Far warranty", &office, &computers);
    request.warranty_expiry_date = NaiveDate::from_ymd_opt(2027, 1, 1);
    assets.create(request, None).await?;

    let mut request = new_asset("Scrapped", &office, &computers);
    request.warranty_expiry_date = NaiveDate::from_ymd_opt(2025, 6, 2);
    request.status = Some(AssetStatus::Disposed);
    assets.create(request, None).await?;

    let mut request = new_asset("Lost", &office, &computers);
    request.status = Some(AssetStatus::Missing);
    let lost = assets.create(request, None).await?;

    // Rows written before the current status names
    sqlx::query(
        "INSERT INTO assets (asset_tag, name, status, category_id, location_id) \
         VALUES ('LEGACY-1', 'Old desktop', 'in_use', $1, $2)",
    )
    .bind(computers.id)
    .bind(office.id)
    .execute(&ctx.pool)
    .await?;

    let dashboard = assets.dashboard_on(today).await?;
    assert_eq!(dashboard.counts.total, 7);
    assert_eq!(dashboard.counts.assigned, 2);
    assert_eq!(dashboard.counts.in_stock, 3);
    assert_eq!(dashboard.counts.missing, 1);
    assert_eq!(dashboard.counts.disposed, 1);
    assert_eq!(dashboard.warranty_warning_date, NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date"));

    let flagged: Vec<i32> = dashboard.attention.iter().map(|a| a.id).collect();
    assert_eq!(flagged, vec![expired.id, expiring.id, lost.id]);
    Ok(())
}
