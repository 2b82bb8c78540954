//! The add product workflow: one form session per operator view.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::notice::Notice;
use crate::domain::product::Product;
use crate::domain::upload::UploadFile;
use crate::forms::products::{AddProductFormPayload, FieldValidation, FormField, ProductFormState};
use crate::models::config::AdminConfig;
use crate::repository::cache::ProductListingCache;
use crate::repository::{
    CategoryReader, ImageUploader, ProductListQuery, ProductReader, ProductWriter,
};
use crate::routes::{Navigator, Notifier};
use crate::services::categories::CategoryPicker;
use crate::services::submission::{SubmissionError, SubmissionGate};
use crate::services::uploads::{SettledUpload, UploadProgress, UploadTracker};

use super::{ServiceError, ServiceResult};

/// Confirmation shown after a product was created.
pub const PRODUCT_CREATED_MESSAGE: &str = "Product added successfully";

/// Collaborators and settings shared by form sessions.
#[derive(Clone)]
pub struct SessionContext {
    pub categories: Arc<dyn CategoryReader>,
    pub products: Arc<dyn ProductWriter>,
    pub uploader: Arc<dyn ImageUploader>,
    pub cache: ProductListingCache,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub upload_timeout: Duration,
    pub navigation_delay: Duration,
    pub products_path: String,
}

impl SessionContext {
    /// Context using the timings and paths from `config`.
    pub fn from_config(
        config: &AdminConfig,
        categories: Arc<dyn CategoryReader>,
        products: Arc<dyn ProductWriter>,
        uploader: Arc<dyn ImageUploader>,
        cache: ProductListingCache,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            categories,
            products,
            uploader,
            cache,
            notifier,
            navigator,
            upload_timeout: config.upload_timeout(),
            navigation_delay: config.navigation_delay(),
            products_path: config.products_path.clone(),
        }
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The product was created and the view navigated away.
    Submitted(Product),
    /// Validation failed; no request was sent.
    Invalid(Vec<(FormField, String)>),
    /// Image uploads are still running.
    Blocked { outstanding: usize },
    /// A submission is in flight or already finished.
    Ignored(SubmissionError),
    /// The backend rejected the product; the form keeps its values.
    Failed(String),
}

/// Fetches the product listing and stores it in `cache`.
pub async fn prime_product_listing<R>(repo: &R, cache: &ProductListingCache) -> ServiceResult<usize>
where
    R: ProductReader + ?Sized,
{
    match repo.list_products(ProductListQuery::default()).await {
        Ok((total, products)) => {
            cache.prime(products, total);
            Ok(total)
        }
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Lists products matching `query` with the total count.
pub async fn search_products<R>(
    repo: &R,
    query: ProductListQuery,
) -> ServiceResult<(usize, Vec<Product>)>
where
    R: ProductReader + ?Sized,
{
    repo.list_products(query).await.map_err(|e| {
        log::error!("Failed to search products: {e}");
        ServiceError::from(e)
    })
}

/// State of one add product form.
pub struct ProductFormSession {
    ctx: SessionContext,
    form: ProductFormState,
    picker: CategoryPicker,
    uploads: UploadTracker,
    gate: SubmissionGate,
}

impl ProductFormSession {
    /// Session with no parent categories loaded yet.
    pub fn new(ctx: SessionContext) -> Self {
        let uploads = UploadTracker::new(Arc::clone(&ctx.uploader), ctx.upload_timeout);
        Self {
            ctx,
            form: ProductFormState::new(),
            picker: CategoryPicker::new(),
            uploads,
            gate: SubmissionGate::new(),
        }
    }

    /// Opens a session, loading parent categories and the product listing
    /// concurrently.
    ///
    /// Only the parent categories are required. When the listing cannot be
    /// fetched the cache stays unprimed and the form opens anyway.
    pub async fn open<R>(ctx: SessionContext, listing: &R) -> ServiceResult<Self>
    where
        R: ProductReader + ?Sized,
    {
        let mut session = Self::new(ctx);
        let categories = Arc::clone(&session.ctx.categories);
        let (parents, primed) = futures::join!(
            session.picker.load_parents(categories.as_ref()),
            prime_product_listing(listing, &session.ctx.cache),
        );
        parents?;
        if let Err(e) = primed {
            log::warn!("Opening the product form without a cached listing: {e}");
        }
        Ok(session)
    }

    pub fn form(&self) -> &ProductFormState {
        &self.form
    }

    pub fn categories(&self) -> &CategoryPicker {
        &self.picker
    }

    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    /// Applies an edit to a text or numeric field.
    pub fn change(&mut self, field: FormField, raw: &str) -> ServiceResult<FieldValidation> {
        Ok(self.form.change(field, raw)?)
    }

    pub fn blur(&mut self, field: FormField) -> FieldValidation {
        self.form.blur(field)
    }

    /// Selects a parent category and loads its children.
    pub async fn select_parent(&mut self, name: &str) -> ServiceResult<()> {
        let categories = Arc::clone(&self.ctx.categories);
        let result = self.picker.select_parent(name, categories.as_ref()).await;
        self.sync_categories();
        self.form.blur(FormField::ParentCategory);
        result
    }

    /// Selects a child category of the current parent by id.
    pub fn select_child(&mut self, id: &str) -> ServiceResult<()> {
        self.picker.select_child(id)?;
        self.sync_categories();
        self.form.blur(FormField::ChildCategory);
        Ok(())
    }

    fn sync_categories(&mut self) {
        let parent = self
            .picker
            .selected_parent()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();
        if self.form.values().parent_category != parent {
            self.form.set_parent_category(&parent);
        }
        let child = self
            .picker
            .selected_child()
            .map(|c| c.as_str().to_string())
            .unwrap_or_default();
        self.form.set_child_category(&child);
    }

    /// Replaces the image batch with `files` and starts uploading them.
    ///
    /// Files without an image content type are skipped with an error notice.
    pub fn drop_files(&mut self, files: Vec<UploadFile>) -> u64 {
        let (images, rejected): (Vec<_>, Vec<_>) =
            files.into_iter().partition(UploadFile::is_image);
        for file in rejected {
            log::warn!("Skipping non-image file {}", file.name);
            self.ctx
                .notifier
                .notify(Notice::error(format!("{} is not an image", file.name)));
        }
        self.uploads.start_batch(images)
    }

    /// Applies upload results that have already arrived.
    pub fn poll_uploads(&mut self) -> UploadProgress {
        let settled = self.uploads.drain_ready();
        self.report_failures(&settled);
        self.uploads.progress()
    }

    /// Waits for every upload of the current batch to finish.
    pub async fn settle_uploads(&mut self) -> UploadProgress {
        let settled = self.uploads.settle().await;
        self.report_failures(&settled);
        self.uploads.progress()
    }

    fn report_failures(&self, settled: &[SettledUpload]) {
        for upload in settled {
            if let Err(reason) = &upload.outcome {
                self.ctx.notifier.notify(Notice::error(format!(
                    "Failed to upload {}: {reason}",
                    upload.name
                )));
            }
        }
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.form.is_valid() && self.uploads.outstanding() == 0 && self.gate.check_ready().is_ok()
    }

    /// Submits the form.
    pub async fn submit(&mut self) -> ServiceResult<SubmitOutcome> {
        if let Err(e) = self.gate.check_ready() {
            log::debug!("Submit ignored: {e}");
            return Ok(SubmitOutcome::Ignored(e));
        }

        self.poll_uploads();
        let outstanding = self.uploads.outstanding();
        if outstanding > 0 {
            return Ok(SubmitOutcome::Blocked { outstanding });
        }

        self.form.touch_all();
        let errors = self.form.values().errors();
        if !errors.is_empty() {
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let payload = AddProductFormPayload::try_from(self.form.values().clone())?;
        let product = payload.into_new_product(self.uploads.results().to_vec());

        if let Err(e) = self.gate.try_begin() {
            return Ok(SubmitOutcome::Ignored(e));
        }
        match self.ctx.products.create_product(&product).await {
            Ok(created) => {
                self.gate.succeed();
                log::info!("Created product {} ({})", created.id, created.name);
                if !self.ctx.cache.append(created.clone()) {
                    log::debug!("Product listing not cached yet; skipping append");
                }
                self.ctx.notifier.notify(Notice::success(PRODUCT_CREATED_MESSAGE));
                tokio::time::sleep(self.ctx.navigation_delay).await;
                self.ctx.navigator.navigate(&self.ctx.products_path);
                Ok(SubmitOutcome::Submitted(created))
            }
            Err(e) => {
                self.gate.fail();
                log::error!("Failed to create product: {e}");
                let message = e.to_string();
                self.ctx.notifier.notify(Notice::error(message.clone()));
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    /// Clears the form, the category selection and the image batch.
    pub fn reset(&mut self) {
        self.form.reset();
        self.picker.reset();
        self.uploads.reset();
        self.gate.reset();
    }
}
