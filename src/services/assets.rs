//! Asset service: creation with tag minting, descriptive edits and the
//! transactional wrapper around the lifecycle state machine.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use sqlx::{PgConnection, Postgres, Transaction};
use validator::Validate;

use super::tags::TagSequencer;
use crate::{
    error::{AppError, AppResult},
    inventory::lifecycle::{
        self, Action, Assignee, Plan, RepairClosure, RepairTicket, Relocation,
    },
    models::{
        asset::{
            Asset, AssetPage, AssetQuery, AssignAsset, CompleteRepair, CreateAsset, MoveAsset,
            StartRepair, TransitionResponse, UpdateAsset,
        },
        asset_event::AssetEvent,
        dashboard::{Dashboard, StatusCounts, ATTENTION_LIMIT, WARRANTY_WARNING_DAYS},
        enums::{AssetStatus, RepairOutcome},
        vendor::{CreateVendor, Vendor},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
    tags: TagSequencer,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AssetsService {
    pub fn new(repository: Repository, tags: TagSequencer) -> Self {
        Self { repository, tags }
    }

    /// List assets
    pub async fn list(&self, query: &AssetQuery) -> AppResult<AssetPage> {
        let status = query
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<AssetStatus>().map_err(AppError::Validation))
            .transpose()?;

        let (items, total) = self.repository.assets.list(query, status).await?;
        Ok(AssetPage {
            items,
            total,
            page: query.page(),
            per_page: query.per_page(),
        })
    }

    /// Get asset by ID
    pub async fn get(&self, id: i32) -> AppResult<Asset> {
        self.repository.assets.get_by_id(id).await
    }

    /// Event history of an asset, newest first
    pub async fn history(&self, id: i32) -> AppResult<Vec<AssetEvent>> {
        self.repository.assets.get_by_id(id).await?;
        self.repository.asset_events.list_for_asset(id).await
    }

    /// Status counts and the assets needing attention as of today
    pub async fn dashboard(&self) -> AppResult<Dashboard> {
        self.dashboard_on(Utc::now().date_naive()).await
    }

    pub async fn dashboard_on(&self, today: NaiveDate) -> AppResult<Dashboard> {
        let counts = StatusCounts::from_rows(self.repository.assets.count_by_status().await?);
        let warranty_warning_date = today + Duration::days(WARRANTY_WARNING_DAYS);
        let attention = self
            .repository
            .assets
            .needing_attention(warranty_warning_date, ATTENTION_LIMIT)
            .await?;
        Ok(Dashboard {
            counts,
            warranty_warning_date,
            attention,
        })
    }

    /// Create an asset, minting its tag for the current year
    pub async fn create(&self, data: CreateAsset, performed_by: Option<i32>) -> AppResult<Asset> {
        self.create_in_year(data, Utc::now().year(), performed_by).await
    }

    /// Create an asset whose tag is drawn from the `year` counter
    pub async fn create_in_year(
        &self,
        data: CreateAsset,
        year: i32,
        performed_by: Option<i32>,
    ) -> AppResult<Asset> {
        data.validate()?;

        let location = self.repository.locations.get_by_id(data.location_id).await?;
        let category = self.repository.categories.get_by_id(data.category_id).await?;
        self.check_references(category.id, data.subcategory_id, data.vendor_id).await?;
        let status = data.status.unwrap_or(AssetStatus::InStock);

        let mut tx = self.repository.begin().await?;
        let tag = self.tags.next_tag(&mut tx, &location, &category, year).await?;
        let asset = self
            .repository
            .assets
            .insert(&mut tx, &tag.to_string(), status, &data)
            .await?;
        let event = lifecycle::creation_event(&asset.asset_tag, status, asset.location_id);
        self.repository
            .asset_events
            .insert(&mut tx, asset.id, &event, performed_by)
            .await?;
        tx.commit().await?;

        tracing::info!(asset_id = asset.id, tag = %asset.asset_tag, status = %status, "Asset created");
        Ok(asset)
    }

    /// Update descriptive fields
    pub async fn update(&self, id: i32, data: UpdateAsset) -> AppResult<Asset> {
        data.validate()?;
        if data.location_id.is_some() {
            return Err(AppError::BusinessRule(
                "Location cannot be edited directly; use the move action".to_string(),
            ));
        }

        let current = self.repository.assets.get_by_id(id).await?;
        let category_id = match data.category_id {
            Some(category_id) => {
                self.repository.categories.get_by_id(category_id).await?;
                Some(category_id)
            }
            None => current.category_id,
        };
        if let Some(category_id) = category_id {
            self.check_references(category_id, data.subcategory_id, data.vendor_id).await?;
        } else if let Some(vendor_id) = data.vendor_id {
            self.repository.vendors.get_by_id(vendor_id).await?;
        }

        // A category change drops a stored sub-category of the old category
        let clear_subcategory = match (data.subcategory_id, current.subcategory_id) {
            (None, Some(stored)) if category_id != current.category_id => {
                let sub = self.repository.categories.get_subcategory(stored).await?;
                Some(sub.category_id) != category_id
            }
            _ => false,
        };

        let asset = self.repository.assets.update(id, &data, clear_subcategory).await?;
        tracing::info!(asset_id = asset.id, tag = %asset.asset_tag, "Asset updated");
        Ok(asset)
    }

    /// Delete an asset and its history. Its tag number stays consumed.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let asset = self.repository.assets.get_by_id(id).await?;
        self.repository.assets.delete(id).await?;
        tracing::info!(asset_id = id, tag = %asset.asset_tag, "Asset deleted");
        Ok(())
    }

    async fn check_references(
        &self,
        category_id: i32,
        subcategory_id: Option<i32>,
        vendor_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(subcategory_id) = subcategory_id {
            let sub = self.repository.categories.get_subcategory(subcategory_id).await?;
            if sub.category_id != category_id {
                return Err(AppError::Validation(format!(
                    "Sub-category '{}' does not belong to the selected category",
                    sub.name
                )));
            }
        }
        if let Some(vendor_id) = vendor_id {
            self.repository.vendors.get_by_id(vendor_id).await?;
        }
        Ok(())
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Run a lifecycle action against the locked asset row
    pub async fn transition(
        &self,
        id: i32,
        action: Action,
        performed_by: Option<i32>,
    ) -> AppResult<TransitionResponse> {
        let mut tx = self.repository.begin().await?;
        let asset = self.repository.assets.get_for_update(&mut tx, id).await?;
        self.commit_plan(tx, asset, action, performed_by).await
    }

    async fn commit_plan(
        &self,
        mut tx: Transaction<'static, Postgres>,
        mut asset: Asset,
        action: Action,
        performed_by: Option<i32>,
    ) -> AppResult<TransitionResponse> {
        let today = Utc::now().date_naive();

        match lifecycle::plan(&asset.lifecycle_state(), &action, today)? {
            Plan::Unchanged(message) => {
                tx.rollback().await?;
                tracing::info!(asset_id = asset.id, action = action.name(), "{}", message);
                Ok(TransitionResponse {
                    changed: false,
                    message,
                    asset,
                    event: None,
                })
            }
            Plan::Apply(transition) => {
                asset.apply_effects(&transition.effects);
                let asset = self.repository.assets.save_lifecycle(&mut tx, &asset).await?;
                let event = self
                    .repository
                    .asset_events
                    .insert(&mut tx, asset.id, &transition.event, performed_by)
                    .await?;
                tx.commit().await?;

                tracing::info!(
                    asset_id = asset.id,
                    tag = %asset.asset_tag,
                    action = action.name(),
                    from = ?transition.event.from_status,
                    to = %transition.event.to_status,
                    "Asset transition applied"
                );
                Ok(TransitionResponse {
                    changed: true,
                    message: transition.event.note,
                    asset,
                    event: Some(event),
                })
            }
        }
    }

    pub async fn assign(&self, id: i32, data: AssignAsset, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        data.validate()?;
        let assignee = Assignee {
            name: data.assigned_to,
            department: data.assigned_department,
            email: data.assigned_email,
        };
        self.transition(id, Action::Assign(assignee), performed_by).await
    }

    pub async fn unassign(&self, id: i32, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        self.transition(id, Action::Unassign, performed_by).await
    }

    /// Send an asset to repair, resolving (and possibly creating) the vendor
    /// in the same transaction
    pub async fn start_repair(&self, id: i32, data: StartRepair, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        let mut tx = self.repository.begin().await?;
        let asset = self.repository.assets.get_for_update(&mut tx, id).await?;

        // Reject before any vendor record gets created
        lifecycle::plan(
            &asset.lifecycle_state(),
            &Action::StartRepair(RepairTicket::default()),
            Utc::now().date_naive(),
        )?;

        let ticket = self.resolve_repair_ticket(&mut tx, &asset, &data).await?;
        self.commit_plan(tx, asset, Action::StartRepair(ticket), performed_by).await
    }

    async fn resolve_repair_ticket(
        &self,
        conn: &mut PgConnection,
        asset: &Asset,
        data: &StartRepair,
    ) -> AppResult<RepairTicket> {
        let phone = non_empty(&data.repair_vendor_phone);
        let address = non_empty(&data.repair_vendor_address);

        let asset_vendor = match (data.use_asset_vendor, asset.vendor_id) {
            (true, Some(vendor_id)) => self.repository.vendors.find_by_id(conn, vendor_id).await?,
            _ => None,
        };

        let vendor = match (asset_vendor, non_empty(&data.repair_vendor)) {
            (Some(vendor), _) => Some(vendor),
            (None, Some(name)) => Some(self.find_or_create_vendor(conn, name, &phone, &address).await?),
            (None, None) => None,
        };

        let mut ticket = RepairTicket {
            reference: non_empty(&data.repair_reference),
            notes: non_empty(&data.repair_notes),
            ..Default::default()
        };
        if let Some(vendor) = vendor {
            ticket.vendor = Some(vendor.name);
            ticket.vendor_phone = vendor.contact_phone;
            ticket.vendor_address = vendor.address;
        }
        // Contact details typed by the user win over the vendor record
        if phone.is_some() {
            ticket.vendor_phone = phone;
        }
        if address.is_some() {
            ticket.vendor_address = address;
        }
        Ok(ticket)
    }

    async fn find_or_create_vendor(
        &self,
        conn: &mut PgConnection,
        name: String,
        phone: &Option<String>,
        address: &Option<String>,
    ) -> AppResult<Vendor> {
        if let Some(vendor) = self.repository.vendors.find_by_name(conn, &name).await? {
            return Ok(vendor);
        }

        let (Some(phone), Some(address)) = (phone.clone(), address.clone()) else {
            return Err(AppError::Validation(format!(
                "Vendor '{}' does not exist; phone and address are required to create it",
                name
            )));
        };

        let new_vendor = CreateVendor {
            name,
            contact_phone: Some(phone),
            address: Some(address),
            ..Default::default()
        };
        new_vendor.validate()?;

        let vendor = self.repository.vendors.insert(conn, &new_vendor).await?;
        tracing::info!(vendor_id = vendor.id, name = %vendor.name, "Created repair vendor");
        Ok(vendor)
    }

    pub async fn complete_repair(&self, id: i32, data: CompleteRepair, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        let closure = RepairClosure {
            outcome: data
                .outcome
                .as_deref()
                .map(RepairOutcome::from)
                .unwrap_or(RepairOutcome::BackToStock),
            cost: data.repair_cost,
            notes: data.repair_notes,
        };
        self.transition(id, Action::CompleteRepair(closure), performed_by).await
    }

    pub async fn dispose(&self, id: i32, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        self.transition(id, Action::Dispose, performed_by).await
    }

    pub async fn mark_damaged(&self, id: i32, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        self.transition(id, Action::MarkDamaged, performed_by).await
    }

    pub async fn mark_missing(&self, id: i32, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        self.transition(id, Action::MarkMissing, performed_by).await
    }

    /// Move an asset to another location
    pub async fn move_to(&self, id: i32, data: MoveAsset, performed_by: Option<i32>) -> AppResult<TransitionResponse> {
        self.repository.locations.get_by_id(data.new_location_id).await?;
        let relocation = Relocation {
            to_location_id: data.new_location_id,
            reason: data.reason,
            reference: data.reference,
        };
        self.transition(id, Action::Move(relocation), performed_by).await
    }
}
