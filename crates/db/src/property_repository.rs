//! Property service operations over the table repositories.
//!
//! Every operation borrows one pooled connection (or opens one transaction)
//! for its own exclusive use and releases it on every exit path. Operations
//! take a caller-owned [`CancellationToken`]; cancellation surfaces as
//! [`CoreError::Cancelled`] and drops any open transaction, which rolls it
//! back. Nothing here retries.

use estate_core::cancel::{ensure_active, run_cancellable};
use estate_core::error::CoreError;
use estate_core::fields::non_blank;
use estate_core::filter::{PropertyFilter, PropertyListRequest};
use estate_core::money::validate_price;
use estate_core::pagination::{Page, PageRequest};
use estate_core::sort::PropertySort;
use estate_core::storage::{owner_photo_file_name, FileContent, FileStore};
use estate_core::types::{DbId, Money};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::error::classify_sqlx_error;
use crate::models::owner::{CreateOwner, InsertOwner, Owner};
use crate::models::property::{CreateProperty, Property, PropertyListItem, UpdateProperty};
use crate::models::property_image::{CreatePropertyImage, PropertyImage};
use crate::models::property_trace::{CreatePropertyTrace, PropertyTrace};
use crate::repositories::{
    OwnerRepo, PropertyImageRepo, PropertyQuery, PropertyRepo, PropertyTraceRepo,
};

/// Data access and mutation service for owners and properties.
pub struct PropertyRepository<S> {
    pool: PgPool,
    files: S,
}

impl<S: FileStore> PropertyRepository<S> {
    pub fn new(pool: PgPool, files: S) -> Self {
        Self { pool, files }
    }

    pub fn files(&self) -> &S {
        &self.files
    }

    // -----------------------------------------------------------------------
    // Owners
    // -----------------------------------------------------------------------

    /// Create an owner, storing the photo through the file store.
    ///
    /// The name check runs before the photo is written, so a duplicate never
    /// leaves an orphaned file. A failed insert after the write does leave
    /// the file behind; no compensation is attempted.
    #[tracing::instrument(skip_all, fields(owner_name = %input.name))]
    pub async fn create_owner(
        &self,
        input: &CreateOwner,
        cancel: &CancellationToken,
    ) -> Result<DbId, CoreError> {
        run_cancellable(cancel, self.create_owner_inner(input, cancel)).await
    }

    async fn create_owner_inner(
        &self,
        input: &CreateOwner,
        cancel: &CancellationToken,
    ) -> Result<DbId, CoreError> {
        if non_blank(Some(input.name.as_str())).is_none() {
            return Err(CoreError::InvalidArgument("owner name must not be blank".into()));
        }

        let mut conn = self.pool.acquire().await.map_err(classify_sqlx_error)?;

        let existing = OwnerRepo::count_by_name(&mut *conn, &input.name)
            .await
            .map_err(classify_sqlx_error)?;
        if existing > 0 {
            tracing::warn!("Rejected duplicate owner name");
            return Err(CoreError::DuplicateEntity {
                entity: "Owner",
                field: "name",
                value: input.name.clone(),
            });
        }

        let photo_url = match &input.photo {
            Some(content) => {
                ensure_active(cancel)?;
                let name = owner_photo_file_name(&input.name);
                Some(self.files.save(content, &name).await?)
            }
            None => None,
        };

        ensure_active(cancel)?;
        let owner = OwnerRepo::create(
            &mut *conn,
            &InsertOwner {
                name: input.name.clone(),
                address: input.address.clone(),
                photo_url,
                birthday: input.birthday,
            },
        )
        .await
        .map_err(classify_sqlx_error)?;

        tracing::info!(owner_id = owner.id, "Owner created");
        Ok(owner.id)
    }

    /// Fetch an owner by id.
    pub async fn get_owner(
        &self,
        owner_id: DbId,
        cancel: &CancellationToken,
    ) -> Result<Owner, CoreError> {
        run_cancellable(cancel, async {
            OwnerRepo::find_by_id(&self.pool, owner_id)
                .await
                .map_err(classify_sqlx_error)?
                .ok_or_else(|| CoreError::NotFound {
                    entity: "Owner",
                    id: owner_id,
                })
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    /// Create a property after checking its internal code is unused.
    ///
    /// The owner reference is enforced by a foreign key: an unknown owner
    /// fails with `NotFound { entity: "Owner" }`.
    #[tracing::instrument(skip_all, fields(code_internal = %input.code_internal))]
    pub async fn create_property(
        &self,
        input: &CreateProperty,
        cancel: &CancellationToken,
    ) -> Result<DbId, CoreError> {
        run_cancellable(cancel, self.create_property_inner(input)).await
    }

    async fn create_property_inner(&self, input: &CreateProperty) -> Result<DbId, CoreError> {
        if non_blank(Some(input.code_internal.as_str())).is_none() {
            return Err(CoreError::InvalidArgument(
                "code_internal must not be blank".into(),
            ));
        }
        let price = validate_price(input.price)?;

        let mut conn = self.pool.acquire().await.map_err(classify_sqlx_error)?;

        let existing = PropertyRepo::count_by_code(&mut *conn, &input.code_internal)
            .await
            .map_err(classify_sqlx_error)?;
        if existing > 0 {
            tracing::warn!("Rejected duplicate property code");
            return Err(CoreError::DuplicateEntity {
                entity: "Property",
                field: "code_internal",
                value: input.code_internal.clone(),
            });
        }

        let property = PropertyRepo::create(&mut *conn, &CreateProperty { price, ..input.clone() })
            .await
            .map_err(classify_sqlx_error)?;

        tracing::info!(
            property_id = property.id,
            owner_id = property.owner_id,
            "Property created"
        );
        Ok(property.id)
    }

    /// Fetch a property by id.
    pub async fn get_property(
        &self,
        property_id: DbId,
        cancel: &CancellationToken,
    ) -> Result<Property, CoreError> {
        run_cancellable(cancel, async {
            PropertyRepo::find_by_id(&self.pool, property_id)
                .await
                .map_err(classify_sqlx_error)?
                .ok_or_else(|| property_not_found(property_id))
        })
        .await
    }

    /// Attach an image to an existing property. Images start enabled.
    #[tracing::instrument(skip(self, content, cancel))]
    pub async fn add_image(
        &self,
        property_id: DbId,
        content: &FileContent,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> Result<DbId, CoreError> {
        run_cancellable(
            cancel,
            self.add_image_inner(property_id, content, file_name, cancel),
        )
        .await
    }

    async fn add_image_inner(
        &self,
        property_id: DbId,
        content: &FileContent,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> Result<DbId, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(classify_sqlx_error)?;

        PropertyRepo::find_by_id(&mut *conn, property_id)
            .await
            .map_err(classify_sqlx_error)?
            .ok_or_else(|| property_not_found(property_id))?;

        ensure_active(cancel)?;
        let file_url = self.files.save(content, file_name).await?;

        ensure_active(cancel)?;
        let image = PropertyImageRepo::create(
            &mut *conn,
            &CreatePropertyImage {
                property_id,
                file_url,
                enabled: None,
            },
        )
        .await
        .map_err(classify_sqlx_error)?;

        tracing::info!(image_id = image.id, "Image attached");
        Ok(image.id)
    }

    /// List a property's images, optionally including disabled ones.
    pub async fn list_images(
        &self,
        property_id: DbId,
        include_disabled: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<PropertyImage>, CoreError> {
        run_cancellable(cancel, async {
            let mut conn = self.pool.acquire().await.map_err(classify_sqlx_error)?;
            PropertyRepo::find_by_id(&mut *conn, property_id)
                .await
                .map_err(classify_sqlx_error)?
                .ok_or_else(|| property_not_found(property_id))?;
            PropertyImageRepo::list_for_property(&mut *conn, property_id, include_disabled)
                .await
                .map_err(classify_sqlx_error)
        })
        .await
    }

    /// Change a property's price and append a `PRICE_CHANGE` trace.
    ///
    /// The price update and the trace insert commit together or not at all.
    /// The row is locked for the duration, so concurrent changes to the same
    /// property serialize and each accepted change gets its own trace.
    /// An unchanged price writes nothing and returns `Ok(None)`.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn change_price(
        &self,
        property_id: DbId,
        new_price: Money,
        cancel: &CancellationToken,
    ) -> Result<Option<PropertyTrace>, CoreError> {
        run_cancellable(cancel, self.change_price_inner(property_id, new_price)).await
    }

    async fn change_price_inner(
        &self,
        property_id: DbId,
        new_price: Money,
    ) -> Result<Option<PropertyTrace>, CoreError> {
        let new_price = validate_price(new_price)?;

        let mut tx = self.pool.begin().await.map_err(classify_sqlx_error)?;

        let property = PropertyRepo::find_by_id_for_update(&mut *tx, property_id)
            .await
            .map_err(classify_sqlx_error)?
            .ok_or_else(|| property_not_found(property_id))?;

        if property.price == new_price {
            tx.rollback().await.map_err(classify_sqlx_error)?;
            tracing::debug!(price = %new_price, "Price unchanged, nothing written");
            return Ok(None);
        }

        PropertyRepo::update_price(&mut *tx, property_id, new_price)
            .await
            .map_err(classify_sqlx_error)?;
        let trace = PropertyTraceRepo::create(
            &mut *tx,
            &CreatePropertyTrace::price_change(property_id, new_price),
        )
        .await
        .map_err(classify_sqlx_error)?;

        tx.commit().await.map_err(classify_sqlx_error)?;

        tracing::info!(
            old_price = %property.price,
            new_price = %new_price,
            trace_id = trace.id,
            "Price changed"
        );
        Ok(Some(trace))
    }

    /// All traces recorded for a property, oldest first.
    pub async fn price_history(
        &self,
        property_id: DbId,
        cancel: &CancellationToken,
    ) -> Result<Vec<PropertyTrace>, CoreError> {
        run_cancellable(cancel, async {
            let mut conn = self.pool.acquire().await.map_err(classify_sqlx_error)?;
            PropertyRepo::find_by_id(&mut *conn, property_id)
                .await
                .map_err(classify_sqlx_error)?
                .ok_or_else(|| property_not_found(property_id))?;
            PropertyTraceRepo::list_for_property(&mut *conn, property_id)
                .await
                .map_err(classify_sqlx_error)
        })
        .await
    }

    /// Apply a partial update to name, address, year, and owner.
    ///
    /// All four columns are rewritten, each with either the incoming value or
    /// the stored one. Concurrent updates are last-writer-wins.
    #[tracing::instrument(skip(self, input, cancel))]
    pub async fn update_property(
        &self,
        property_id: DbId,
        input: &UpdateProperty,
        cancel: &CancellationToken,
    ) -> Result<Property, CoreError> {
        run_cancellable(cancel, self.update_property_inner(property_id, input)).await
    }

    async fn update_property_inner(
        &self,
        property_id: DbId,
        input: &UpdateProperty,
    ) -> Result<Property, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(classify_sqlx_error)?;

        let current = PropertyRepo::find_by_id(&mut *conn, property_id)
            .await
            .map_err(classify_sqlx_error)?
            .ok_or_else(|| property_not_found(property_id))?;

        let resolved = input.resolve(&current);
        let updated = PropertyRepo::update_fields(&mut *conn, property_id, &resolved)
            .await
            .map_err(classify_sqlx_error)?
            .ok_or_else(|| property_not_found(property_id))?;

        tracing::info!(owner_id = updated.owner_id, "Property updated");
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// List properties matching the request's filters, one page at a time.
    ///
    /// The total counts every matching row regardless of paging. Count and
    /// page are read from the same snapshot.
    #[tracing::instrument(skip_all, fields(page = request.page, page_size = request.page_size))]
    pub async fn list_properties(
        &self,
        request: &PropertyListRequest,
        cancel: &CancellationToken,
    ) -> Result<Page<PropertyListItem>, CoreError> {
        let (page, sort) = request.validate()?;
        run_cancellable(cancel, self.list_page(&request.filter, page, sort)).await
    }

    /// First listing row for an owner, newest property first.
    ///
    /// An owner with no properties (or no such owner) is
    /// `NotFound { entity: "Owner" }` carrying the owner id.
    pub async fn first_property_for_owner(
        &self,
        owner_id: DbId,
        cancel: &CancellationToken,
    ) -> Result<PropertyListItem, CoreError> {
        let filter = PropertyFilter::for_owner(owner_id);
        let page = PageRequest::new(1, 1)?;
        let result = run_cancellable(cancel, self.list_page(&filter, page, PropertySort::IdDesc))
            .await?;
        result
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound {
                entity: "Owner",
                id: owner_id,
            })
    }

    async fn list_page(
        &self,
        filter: &PropertyFilter,
        page: PageRequest,
        sort: PropertySort,
    ) -> Result<Page<PropertyListItem>, CoreError> {
        let plan = PropertyQuery::new(&filter.conditions());

        let mut tx = self.pool.begin().await.map_err(classify_sqlx_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(classify_sqlx_error)?;

        let total = PropertyRepo::count_matching(&mut *tx, &plan)
            .await
            .map_err(classify_sqlx_error)?;
        let items = PropertyRepo::list_page(&mut *tx, &plan, sort, page)
            .await
            .map_err(classify_sqlx_error)?;

        tx.commit().await.map_err(classify_sqlx_error)?;

        tracing::debug!(
            conditions = plan.condition_count(),
            %sort,
            total,
            returned = items.len(),
            "Listed properties"
        );
        Ok(Page::new(items, total, page))
    }
}

fn property_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Property",
        id,
    }
}
