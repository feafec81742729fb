use std::sync::Arc;

use gatehouse_core::constants::ROOT_PARENT_ID;
use gatehouse_db::model::menu::{Menu, MenuDraft};
use gatehouse_db::store::MenuRepository;

use crate::error::{ServiceError, ServiceResult};
use crate::menu::tree::{MenuNode, build_tree};

fn menu_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("menu {id}"))
}

/// Normalizes and checks a draft before it is written.
fn validate(mut draft: MenuDraft, id: Option<i64>) -> ServiceResult<MenuDraft> {
    draft.path = draft.path.trim().to_owned();
    draft.name = draft.name.trim().to_owned();
    if draft.path.is_empty() || draft.name.is_empty() {
        return Err(ServiceError::ValidationError(
            "menu path and name are required".to_owned(),
        ));
    }

    let parent_id = draft.parent_id.trim();
    draft.parent_id = if parent_id.is_empty() {
        ROOT_PARENT_ID.to_owned()
    } else {
        parent_id.to_owned()
    };
    let parent: i64 = draft.parent_id.parse().map_err(|_err| {
        ServiceError::ValidationError("menu parent must be a menu id or \"0\"".to_owned())
    })?;
    if id == Some(parent) {
        return Err(ServiceError::ValidationError(
            "a menu cannot be its own parent".to_owned(),
        ));
    }

    Ok(draft)
}

/// Administration of the navigation menu.
#[derive(Clone)]
pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
}

impl MenuService {
    #[must_use]
    pub fn new(menus: Arc<dyn MenuRepository>) -> Self {
        Self { menus }
    }

    /// ## Summary
    /// The full menu tree, enabled or not, ordered by sort key.
    ///
    /// ## Errors
    /// Returns a storage error if menus cannot be read.
    pub async fn list(&self) -> ServiceResult<Vec<MenuNode>> {
        Ok(build_tree(self.menus.list_menus().await?))
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown menu.
    pub async fn get(&self, id: i64) -> ServiceResult<Menu> {
        self.menus
            .find_menu(id)
            .await?
            .ok_or_else(|| menu_not_found(id))
    }

    /// ## Summary
    /// Creates a menu entry. A blank parent makes it a top-level entry.
    ///
    /// ## Errors
    /// Returns `ValidationError` for a blank path or name or a non-numeric parent.
    #[tracing::instrument(skip_all, fields(path = %draft.path))]
    pub async fn create(&self, draft: MenuDraft) -> ServiceResult<Menu> {
        let draft = validate(draft, None)?;
        let menu = self.menus.insert_menu(&draft).await?;
        tracing::info!(menu_id = menu.id, "Menu created");
        Ok(menu)
    }

    /// ## Summary
    /// Replaces every field of a menu entry.
    ///
    /// ## Errors
    /// Returns `ValidationError` as for [`MenuService::create`] and `NotFound` for an unknown menu.
    #[tracing::instrument(skip(self, draft))]
    pub async fn update(&self, id: i64, draft: MenuDraft) -> ServiceResult<Menu> {
        let draft = validate(draft, Some(id))?;
        self.menus
            .update_menu(id, &draft)
            .await?
            .ok_or_else(|| menu_not_found(id))
    }

    /// ## Summary
    /// Deletes a leaf menu entry that no role grants.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown menu and `Conflict` when the entry has
    /// children or is granted to a role.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.get(id).await?;

        if self.menus.count_menu_children(id).await? > 0 {
            return Err(ServiceError::Conflict(
                "menu has child entries".to_owned(),
            ));
        }
        if self.menus.count_menu_grants(id).await? > 0 {
            return Err(ServiceError::Conflict(
                "menu is granted to a role".to_owned(),
            ));
        }

        if self.menus.delete_menu(id).await? {
            tracing::info!("Menu deleted");
            Ok(())
        } else {
            Err(menu_not_found(id))
        }
    }
}
