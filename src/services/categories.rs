//! Two-level category selection for the add product form.

use crate::domain::category::CategoryOption;
use crate::domain::types::{CategoryId, CategoryName};
use crate::repository::CategoryReader;

use super::{ServiceError, ServiceResult};

/// Parent and child category options plus the current selection.
///
/// Children are only fetched after a parent is chosen. Every selection bumps
/// a request counter so a slow child listing for a previously selected
/// parent cannot replace the options of the current one.
#[derive(Debug, Clone, Default)]
pub struct CategoryPicker {
    parents: Vec<CategoryOption>,
    children: Vec<CategoryOption>,
    parent: Option<CategoryName>,
    child: Option<CategoryId>,
    request: u64,
}

impl CategoryPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the top-level categories.
    pub async fn load_parents<R>(&mut self, repo: &R) -> ServiceResult<()>
    where
        R: CategoryReader + ?Sized,
    {
        let parents = repo.parent_categories().await.map_err(|e| {
            log::error!("Failed to list parent categories: {e}");
            ServiceError::from(e)
        })?;
        self.install_parents(parents);
        Ok(())
    }

    pub fn install_parents(&mut self, parents: Vec<CategoryOption>) {
        self.parents = parents;
    }

    /// Selects a parent, clearing the child selection and its options.
    ///
    /// Returns the request number the child listing must be installed with.
    pub fn begin_parent_selection(&mut self, parent: CategoryName) -> u64 {
        self.request += 1;
        self.parent = Some(parent);
        self.child = None;
        self.children.clear();
        self.request
    }

    /// Installs a child listing fetched for request `request`.
    ///
    /// Returns `false` and keeps the current options when a newer parent was
    /// selected in the meantime. Options not belonging to the selected parent
    /// are dropped.
    pub fn install_children(&mut self, request: u64, children: Vec<CategoryOption>) -> bool {
        if request != self.request {
            log::debug!("Ignoring child categories of superseded request {request}");
            return false;
        }
        let Some(parent) = &self.parent else {
            return false;
        };
        self.children = children
            .into_iter()
            .filter(|child| child.belongs_to(parent))
            .collect();
        true
    }

    /// Selects a parent by name and fetches its children.
    pub async fn select_parent<R>(&mut self, parent: &str, repo: &R) -> ServiceResult<()>
    where
        R: CategoryReader + ?Sized,
    {
        let parent = CategoryName::new(parent)?;
        if !self.parents.iter().any(|p| p.name == parent) {
            log::warn!("Unknown parent category selected: {parent}");
            return Err(ServiceError::NotFound);
        }

        let request = self.begin_parent_selection(parent.clone());
        let children = repo.child_categories(&parent).await.map_err(|e| {
            log::error!("Failed to list child categories of {parent}: {e}");
            ServiceError::from(e)
        })?;
        self.install_children(request, children);
        Ok(())
    }

    /// Selects one of the currently offered child categories by id.
    pub fn select_child(&mut self, id: &str) -> ServiceResult<&CategoryOption> {
        let id = CategoryId::new(id)?;
        let Some(child) = self.children.iter().find(|c| c.id == id) else {
            log::warn!("Child category {id} is not offered for the selected parent");
            return Err(ServiceError::NotFound);
        };
        self.child = Some(id);
        Ok(child)
    }

    pub fn parents(&self) -> &[CategoryOption] {
        &self.parents
    }

    pub fn children(&self) -> &[CategoryOption] {
        &self.children
    }

    pub fn selected_parent(&self) -> Option<&CategoryName> {
        self.parent.as_ref()
    }

    pub fn selected_child(&self) -> Option<&CategoryId> {
        self.child.as_ref()
    }

    /// Clears the selection but keeps the loaded parents.
    pub fn reset(&mut self) {
        self.request += 1;
        self.parent = None;
        self.child = None;
        self.children.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::TestRepository;

    async fn loaded() -> (CategoryPicker, TestRepository) {
        let repo = TestRepository::default();
        let mut picker = CategoryPicker::new();
        picker.load_parents(&repo).await.unwrap();
        (picker, repo)
    }

    fn names(options: &[CategoryOption]) -> Vec<&str> {
        options.iter().map(|o| o.name.as_str()).collect()
    }

    #[tokio::test]
    async fn children_follow_selected_parent() {
        let (mut picker, repo) = loaded().await;
        assert_eq!(names(picker.parents()), vec!["Fruits", "Vegetables"]);
        assert!(picker.children().is_empty());

        picker.select_parent("Fruits", &repo).await.unwrap();
        assert_eq!(names(picker.children()), vec!["Apples", "Pears"]);

        let child = picker.select_child("c-apples").unwrap();
        assert_eq!(child.name, "Apples");
    }

    #[tokio::test]
    async fn changing_parent_clears_child() {
        let (mut picker, repo) = loaded().await;
        picker.select_parent("Fruits", &repo).await.unwrap();
        picker.select_child("c-pears").unwrap();

        picker.select_parent("Vegetables", &repo).await.unwrap();

        assert!(picker.selected_child().is_none());
        assert_eq!(names(picker.children()), vec!["Carrots"]);
        assert_eq!(picker.select_child("c-pears"), Err(ServiceError::NotFound));
    }

    #[tokio::test]
    async fn unknown_parent_is_rejected() {
        let (mut picker, repo) = loaded().await;
        let result = picker.select_parent("Toys", &repo).await;
        assert_eq!(result, Err(ServiceError::NotFound));
        assert!(picker.selected_parent().is_none());
    }

    #[test]
    fn superseded_child_listing_is_ignored() {
        let fruits = CategoryName::new("Fruits").unwrap();
        let vegetables = CategoryName::new("Vegetables").unwrap();
        let mut picker = CategoryPicker::new();

        let stale = picker.begin_parent_selection(fruits);
        let current = picker.begin_parent_selection(vegetables.clone());

        let apples = CategoryOption {
            id: CategoryId::new("c-apples").unwrap(),
            name: CategoryName::new("Apples").unwrap(),
            parent: Some(CategoryName::new("Fruits").unwrap()),
        };
        assert!(!picker.install_children(stale, vec![apples.clone()]));
        assert!(picker.children().is_empty());

        // Mismatched parents are filtered even for the current request.
        assert!(picker.install_children(current, vec![apples]));
        assert!(picker.children().is_empty());
        assert_eq!(picker.selected_parent(), Some(&vegetables));
    }
}
