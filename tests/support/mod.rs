#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use brandpage::application::auth::{Principal, SessionService};
use brandpage::application::brands::CreateBrandCommand;
use brandpage::application::landing_pages::CreateLandingPageCommand;
use brandpage::application::repos::{
    BrandsRepo, CatalogRepo, ContactRepo, CreateBrandParams, CreateContactParams,
    CreateFileParams, CreateLandingPageParams, FilesRepo, HealthRepo, LandingPagesRepo,
    ProductDesignsRepo, ProductParams, QrCodeParams, QrCodesRepo, RecordScanParams,
    RecordVisitParams, RepoError, SaveDesignParams, SessionsRepo, UpdateBrandParams,
    UpdateLandingPageParams, VisitsRepo,
};
use brandpage::domain::entities::{
    BrandRecord, CategoryRecord, ContactSubmissionRecord, FileRecord, LandingPageRecord,
    LandingPageViewRecord, PageComponentRecord, ProductDesignRecord, ProductRecord, QrCodeRecord,
    QrScanRecord, SessionRecord, SubcategoryRecord, UserRecord,
};
use brandpage::config::{self, CliArgs};
use brandpage::infra::app::build_router_state;
use brandpage::infra::http::RouterState;
use brandpage::infra::uploads::UploadStorage;

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, UserRecord>,
    sessions: HashMap<String, SessionRecord>,
    brands: HashMap<Uuid, BrandRecord>,
    categories: HashMap<Uuid, CategoryRecord>,
    subcategories: HashMap<Uuid, SubcategoryRecord>,
    products: HashMap<Uuid, ProductRecord>,
    files: HashMap<Uuid, FileRecord>,
    pages: HashMap<Uuid, LandingPageRecord>,
    components: HashMap<Uuid, Vec<PageComponentRecord>>,
    designs: HashMap<Uuid, ProductDesignRecord>,
    qr_codes: HashMap<Uuid, QrCodeRecord>,
    scans: Vec<QrScanRecord>,
    visits: Vec<LandingPageViewRecord>,
    contacts: Vec<ContactSubmissionRecord>,
}

/// Every repository trait backed by one in-memory store.
#[derive(Default)]
pub struct InMemoryRepos {
    store: Mutex<Store>,
    failing_health: bool,
}

impl InMemoryRepos {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unhealthy() -> Arc<Self> {
        Arc::new(Self {
            failing_health: true,
            ..Self::default()
        })
    }

    /// Register a user with a session valid for one hour and return the token.
    pub async fn sign_in(&self, token: &str) -> Principal {
        let user_id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let mut store = self.store.lock().await;
        store.users.insert(
            user_id,
            UserRecord {
                id: user_id,
                email: format!("{user_id}@example.test"),
                display_name: None,
                created_at: now,
            },
        );
        store.sessions.insert(
            SessionService::hash_token(token),
            SessionRecord {
                token_hash: SessionService::hash_token(token),
                user_id,
                expires_at: now + Duration::hours(1),
                created_at: now,
            },
        );
        Principal { user_id }
    }

    pub async fn expire_session(&self, token: &str) {
        let mut store = self.store.lock().await;
        if let Some(session) = store.sessions.get_mut(&SessionService::hash_token(token)) {
            session.expires_at = OffsetDateTime::UNIX_EPOCH;
        }
    }

    pub async fn views(&self) -> Vec<LandingPageViewRecord> {
        self.store.lock().await.visits.clone()
    }

    pub async fn scans(&self) -> Vec<QrScanRecord> {
        self.store.lock().await.scans.clone()
    }

    pub async fn contacts(&self) -> Vec<ContactSubmissionRecord> {
        self.store.lock().await.contacts.clone()
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Mirrors how Postgres foreign key violations surface through the repos.
fn require_row(exists: bool, constraint: &str) -> Result<(), RepoError> {
    if exists {
        Ok(())
    } else {
        Err(RepoError::InvalidInput {
            message: format!("violates foreign key constraint \"{constraint}\""),
        })
    }
}

#[async_trait]
impl SessionsRepo for InMemoryRepos {
    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self.store.lock().await.sessions.get(token_hash).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.store.lock().await.users.get(&id).cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepoError> {
        self.store.lock().await.sessions.remove(token_hash);
        Ok(())
    }
}

#[async_trait]
impl BrandsRepo for InMemoryRepos {
    async fn list_brands(&self, owner_id: Uuid) -> Result<Vec<BrandRecord>, RepoError> {
        let store = self.store.lock().await;
        let mut brands: Vec<_> = store
            .brands
            .values()
            .filter(|brand| brand.owner_id == owner_id)
            .cloned()
            .collect();
        brands.sort_by_key(|brand| brand.created_at);
        Ok(brands)
    }

    async fn find_brand(&self, id: Uuid) -> Result<Option<BrandRecord>, RepoError> {
        Ok(self.store.lock().await.brands.get(&id).cloned())
    }

    async fn brand_slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let store = self.store.lock().await;
        Ok(store.brands.values().any(|brand| brand.slug == slug))
    }

    async fn create_brand(&self, params: CreateBrandParams) -> Result<BrandRecord, RepoError> {
        let mut store = self.store.lock().await;
        if store.brands.values().any(|brand| brand.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "brands_slug_key".into(),
            });
        }
        let record = BrandRecord {
            id: Uuid::new_v4(),
            owner_id: params.owner_id,
            name: params.name,
            slug: params.slug,
            logo_url: params.logo_url,
            website: params.website,
            description: params.description,
            created_at: now(),
            updated_at: now(),
        };
        store.brands.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_brand(&self, params: UpdateBrandParams) -> Result<BrandRecord, RepoError> {
        let mut store = self.store.lock().await;
        let brand = store.brands.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        brand.name = params.name;
        brand.logo_url = params.logo_url;
        brand.website = params.website;
        brand.description = params.description;
        brand.updated_at = now();
        Ok(brand.clone())
    }

    async fn delete_brand(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.lock().await;
        store.brands.remove(&id).ok_or(RepoError::NotFound)?;
        store.pages.retain(|_, page| page.brand_id != id);
        store.qr_codes.retain(|_, code| code.brand_id != id);
        store.products.retain(|_, product| product.brand_id != id);
        Ok(())
    }
}

fn product_record(id: Uuid, params: ProductParams, created_at: OffsetDateTime) -> ProductRecord {
    ProductRecord {
        id,
        brand_id: params.brand_id,
        category_id: params.category_id,
        subcategory_id: params.subcategory_id,
        name: params.name,
        description: params.description,
        price_cents: params.price_cents,
        image_url: params.image_url,
        sku: params.sku,
        created_at,
        updated_at: now(),
    }
}

#[async_trait]
impl CatalogRepo for InMemoryRepos {
    async fn list_categories(&self, brand_id: Uuid) -> Result<Vec<CategoryRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .categories
            .values()
            .filter(|category| category.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self.store.lock().await.categories.get(&id).cloned())
    }

    async fn create_category(
        &self,
        brand_id: Uuid,
        name: &str,
    ) -> Result<CategoryRecord, RepoError> {
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            brand_id,
            name: name.to_string(),
            created_at: now(),
        };
        self.store
            .lock()
            .await
            .categories
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<CategoryRecord, RepoError> {
        let mut store = self.store.lock().await;
        let category = store.categories.get_mut(&id).ok_or(RepoError::NotFound)?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.lock().await;
        store.categories.remove(&id);
        store.subcategories.retain(|_, sub| sub.category_id != id);
        Ok(())
    }

    async fn list_subcategories(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<SubcategoryRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .subcategories
            .values()
            .filter(|sub| sub.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<SubcategoryRecord>, RepoError> {
        Ok(self.store.lock().await.subcategories.get(&id).cloned())
    }

    async fn create_subcategory(
        &self,
        category_id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, RepoError> {
        let record = SubcategoryRecord {
            id: Uuid::new_v4(),
            category_id,
            name: name.to_string(),
            created_at: now(),
        };
        self.store
            .lock()
            .await
            .subcategories
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn rename_subcategory(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, RepoError> {
        let mut store = self.store.lock().await;
        let sub = store.subcategories.get_mut(&id).ok_or(RepoError::NotFound)?;
        sub.name = name.to_string();
        Ok(sub.clone())
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.lock().await.subcategories.remove(&id);
        Ok(())
    }

    async fn list_products(&self, brand_id: Uuid) -> Result<Vec<ProductRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .products
            .values()
            .filter(|product| product.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        Ok(self.store.lock().await.products.get(&id).cloned())
    }

    async fn create_product(&self, params: ProductParams) -> Result<ProductRecord, RepoError> {
        let record = product_record(Uuid::new_v4(), params, now());
        self.store
            .lock()
            .await
            .products
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        id: Uuid,
        params: ProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let mut store = self.store.lock().await;
        let created_at = store
            .products
            .get(&id)
            .map(|product| product.created_at)
            .ok_or(RepoError::NotFound)?;
        let record = product_record(id, params, created_at);
        store.products.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.lock().await.products.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl FilesRepo for InMemoryRepos {
    async fn list_files(
        &self,
        owner_id: Uuid,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<FileRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .files
            .values()
            .filter(|file| file.owner_id == owner_id)
            .filter(|file| brand_id.is_none() || file.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileRecord>, RepoError> {
        Ok(self.store.lock().await.files.get(&id).cloned())
    }

    async fn create_file(&self, params: CreateFileParams) -> Result<FileRecord, RepoError> {
        let record = FileRecord {
            id: Uuid::new_v4(),
            brand_id: params.brand_id,
            owner_id: params.owner_id,
            bucket: params.bucket,
            filename: params.filename,
            content_type: params.content_type,
            size_bytes: params.size_bytes,
            checksum: params.checksum,
            stored_path: params.stored_path,
            width: params.width,
            height: params.height,
            created_at: now(),
        };
        self.store
            .lock()
            .await
            .files
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.lock().await.files.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl LandingPagesRepo for InMemoryRepos {
    async fn list_pages(&self, brand_id: Uuid) -> Result<Vec<LandingPageRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .pages
            .values()
            .filter(|page| page.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn find_page(&self, id: Uuid) -> Result<Option<LandingPageRecord>, RepoError> {
        Ok(self.store.lock().await.pages.get(&id).cloned())
    }

    async fn find_page_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<LandingPageRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store.pages.values().find(|page| page.slug == slug).cloned())
    }

    async fn create_page(
        &self,
        params: CreateLandingPageParams,
    ) -> Result<LandingPageRecord, RepoError> {
        let mut store = self.store.lock().await;
        if store.pages.values().any(|page| page.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "landing_pages_slug_key".into(),
            });
        }
        let record = LandingPageRecord {
            id: Uuid::new_v4(),
            brand_id: params.brand_id,
            title: params.title,
            slug: params.slug,
            background_color: params.background_color,
            font_family: params.font_family,
            published: params.published,
            created_at: now(),
            updated_at: now(),
        };
        store.pages.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_page(
        &self,
        params: UpdateLandingPageParams,
    ) -> Result<LandingPageRecord, RepoError> {
        let mut store = self.store.lock().await;
        if store
            .pages
            .values()
            .any(|page| page.slug == params.slug && page.id != params.id)
        {
            return Err(RepoError::Duplicate {
                constraint: "landing_pages_slug_key".into(),
            });
        }
        let page = store.pages.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        page.title = params.title;
        page.slug = params.slug;
        page.background_color = params.background_color;
        page.font_family = params.font_family;
        page.published = params.published;
        page.updated_at = now();
        Ok(page.clone())
    }

    async fn delete_page(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.lock().await;
        store.pages.remove(&id);
        store.components.remove(&id);
        for code in store.qr_codes.values_mut() {
            if code.landing_page_id == Some(id) {
                code.landing_page_id = None;
            }
        }
        Ok(())
    }

    async fn list_components(
        &self,
        page_id: Uuid,
    ) -> Result<Vec<PageComponentRecord>, RepoError> {
        let store = self.store.lock().await;
        let mut rows = store.components.get(&page_id).cloned().unwrap_or_default();
        rows.sort_by_key(|row| row.position);
        Ok(rows)
    }

    async fn replace_components(
        &self,
        page_id: Uuid,
        components: &[PageComponentRecord],
    ) -> Result<(), RepoError> {
        self.store
            .lock()
            .await
            .components
            .insert(page_id, components.to_vec());
        Ok(())
    }
}

#[async_trait]
impl ProductDesignsRepo for InMemoryRepos {
    async fn list_designs(&self, user_id: Uuid) -> Result<Vec<ProductDesignRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .designs
            .values()
            .filter(|design| design.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_design(&self, id: Uuid) -> Result<Option<ProductDesignRecord>, RepoError> {
        Ok(self.store.lock().await.designs.get(&id).cloned())
    }

    async fn create_design(
        &self,
        params: SaveDesignParams,
    ) -> Result<ProductDesignRecord, RepoError> {
        let record = ProductDesignRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            product_id: params.product_id,
            title: params.title,
            content: params.content,
            published: params.published,
            created_at: now(),
            updated_at: now(),
        };
        self.store
            .lock()
            .await
            .designs
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_design(
        &self,
        id: Uuid,
        params: SaveDesignParams,
    ) -> Result<ProductDesignRecord, RepoError> {
        let mut store = self.store.lock().await;
        let design = store.designs.get_mut(&id).ok_or(RepoError::NotFound)?;
        design.product_id = params.product_id;
        design.title = params.title;
        design.content = params.content;
        design.published = params.published;
        design.updated_at = now();
        Ok(design.clone())
    }

    async fn delete_design(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.lock().await.designs.remove(&id);
        Ok(())
    }
}

fn qr_record(id: Uuid, params: QrCodeParams) -> QrCodeRecord {
    QrCodeRecord {
        id,
        brand_id: params.brand_id,
        name: params.name,
        target_kind: params.target_kind,
        landing_page_id: params.landing_page_id,
        external_url: params.external_url,
        foreground_color: params.foreground_color,
        background_color: params.background_color,
        size: params.size,
        scan_count: 0,
        view_count: 0,
        created_at: now(),
        updated_at: now(),
    }
}

#[async_trait]
impl QrCodesRepo for InMemoryRepos {
    async fn list_qr_codes(&self, brand_id: Uuid) -> Result<Vec<QrCodeRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .qr_codes
            .values()
            .filter(|code| code.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn find_qr_code(&self, id: Uuid) -> Result<Option<QrCodeRecord>, RepoError> {
        Ok(self.store.lock().await.qr_codes.get(&id).cloned())
    }

    async fn create_qr_code(&self, params: QrCodeParams) -> Result<QrCodeRecord, RepoError> {
        let record = qr_record(Uuid::new_v4(), params);
        self.store
            .lock()
            .await
            .qr_codes
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_qr_code(
        &self,
        id: Uuid,
        params: QrCodeParams,
    ) -> Result<QrCodeRecord, RepoError> {
        let mut store = self.store.lock().await;
        let current = store.qr_codes.get(&id).cloned().ok_or(RepoError::NotFound)?;
        let mut record = qr_record(id, params);
        record.scan_count = current.scan_count;
        record.view_count = current.view_count;
        record.created_at = current.created_at;
        store.qr_codes.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_qr_code(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.lock().await.qr_codes.remove(&id);
        Ok(())
    }

    async fn record_scan(&self, params: RecordScanParams) -> Result<QrScanRecord, RepoError> {
        let mut store = self.store.lock().await;
        if let Some(user_id) = params.user_id {
            require_row(store.users.contains_key(&user_id), "qr_scans_user_id_fkey")?;
        }
        let code = store
            .qr_codes
            .get_mut(&params.qr_code_id)
            .ok_or(RepoError::NotFound)?;
        code.scan_count += 1;
        let scan = QrScanRecord {
            id: Uuid::new_v4(),
            qr_code_id: params.qr_code_id,
            user_id: params.user_id,
            user_agent: params.user_agent,
            scanned_at: params.scanned_at,
        };
        store.scans.push(scan.clone());
        Ok(scan)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.lock().await;
        if let Some(code) = store.qr_codes.get_mut(&id) {
            code.view_count += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl VisitsRepo for InMemoryRepos {
    async fn upsert_visit(
        &self,
        params: RecordVisitParams,
    ) -> Result<LandingPageViewRecord, RepoError> {
        let mut store = self.store.lock().await;
        require_row(
            store.users.contains_key(&params.user_id),
            "landing_page_views_user_id_fkey",
        )?;
        if let Some(qr_code_id) = params.qr_code_id {
            require_row(
                store.qr_codes.contains_key(&qr_code_id),
                "landing_page_views_qr_code_id_fkey",
            )?;
        }
        if let Some(existing) = store.visits.iter_mut().find(|view| {
            view.user_id == params.user_id && view.landing_page_id == params.landing_page_id
        }) {
            existing.visit_count += 1;
            existing.last_visited_at = params.visited_at;
            return Ok(existing.clone());
        }

        let record = LandingPageViewRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            landing_page_id: params.landing_page_id,
            source: params.source,
            qr_code_id: params.qr_code_id,
            visit_count: 1,
            first_visited_at: params.visited_at,
            last_visited_at: params.visited_at,
        };
        store.visits.push(record.clone());
        Ok(record)
    }

    async fn list_views(
        &self,
        landing_page_id: Uuid,
    ) -> Result<Vec<LandingPageViewRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .visits
            .iter()
            .filter(|view| view.landing_page_id == landing_page_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContactRepo for InMemoryRepos {
    async fn create_submission(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactSubmissionRecord, RepoError> {
        let record = ContactSubmissionRecord {
            id: Uuid::new_v4(),
            landing_page_id: params.landing_page_id,
            name: params.name,
            email: params.email,
            message: params.message,
            created_at: now(),
        };
        self.store.lock().await.contacts.push(record.clone());
        Ok(record)
    }

    async fn list_submissions(
        &self,
        landing_page_id: Uuid,
    ) -> Result<Vec<ContactSubmissionRecord>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .contacts
            .iter()
            .filter(|contact| contact.landing_page_id == Some(landing_page_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HealthRepo for InMemoryRepos {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.failing_health {
            Err(RepoError::Timeout)
        } else {
            Ok(())
        }
    }
}

/// Router state over `repos` with uploads in a fresh temporary directory.
pub fn router_state(repos: Arc<InMemoryRepos>) -> (RouterState, tempfile::TempDir) {
    let settings = config::load(&CliArgs {
        config_file: None,
        command: None,
    })
    .expect("default settings load");
    let uploads = tempfile::tempdir().expect("temp upload dir");
    let storage =
        Arc::new(UploadStorage::new(uploads.path().to_path_buf()).expect("upload storage"));
    (build_router_state(repos, &settings, storage), uploads)
}

pub async fn seed_brand(state: &RouterState, principal: &Principal, name: &str) -> BrandRecord {
    state
        .api
        .brands
        .create(
            principal,
            CreateBrandCommand {
                name: name.to_string(),
                logo_url: None,
                website: None,
                description: None,
            },
        )
        .await
        .expect("brand created")
}

pub async fn seed_page(
    state: &RouterState,
    principal: &Principal,
    brand_id: Uuid,
    slug: &str,
    published: bool,
) -> LandingPageRecord {
    state
        .api
        .landing_pages
        .create(
            principal,
            CreateLandingPageCommand {
                brand_id,
                title: format!("Landing {slug}"),
                slug: Some(slug.to_string()),
                background_color: None,
                font_family: None,
                published,
            },
        )
        .await
        .expect("landing page created")
}
