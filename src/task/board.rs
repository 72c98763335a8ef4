//! Kanban boards and their assembled view.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::item::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardCard {
    pub id: i64,
    pub task_id: i64,
    pub column_id: i64,
    pub order_index: i64,
}

/// Board detail as served by `/api/boards/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDetail {
    pub board: Board,
    #[serde(default)]
    pub columns: Vec<BoardColumn>,
    #[serde(default)]
    pub cards: Vec<BoardCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub card_id: i64,
    pub task_id: i64,
    pub order_index: i64,
    /// None when the card points at a task the backend no longer has
    pub task: Option<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView {
    pub id: i64,
    pub name: String,
    pub cards: Vec<CardView>,
}

/// A board with cards resolved to tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub board: Board,
    pub columns: Vec<ColumnView>,
    /// Tasks assigned to this board that no card references
    pub unmapped_tasks: Vec<Task>,
    /// Cards whose task is missing from the task list
    pub dangling_card_ids: Vec<i64>,
}

impl BoardDetail {
    /// Task ids referenced by any card on this board.
    pub fn mapped_task_ids(&self) -> HashSet<i64> {
        self.cards.iter().map(|c| c.task_id).collect()
    }

    /// Tasks that belong to this board but have no card.
    pub fn unmapped_tasks<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mapped = self.mapped_task_ids();
        tasks
            .iter()
            .filter(|t| t.parent_board_id == Some(self.board.id) && !mapped.contains(&t.id))
            .collect()
    }

    /// Resolve cards against `tasks` and group them by column.
    ///
    /// Columns keep backend order; cards within a column are ordered by
    /// `order_index`. Cards pointing at an unknown column are dropped.
    pub fn assemble(&self, tasks: &[Task]) -> BoardView {
        let by_id: HashMap<i64, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

        let mut columns: Vec<ColumnView> = self
            .columns
            .iter()
            .map(|c| ColumnView {
                id: c.id,
                name: c.name.clone(),
                cards: Vec::new(),
            })
            .collect();

        let mut dangling_card_ids = Vec::new();
        for card in &self.cards {
            let task = by_id.get(&card.task_id).map(|t| (*t).clone());
            if task.is_none() {
                dangling_card_ids.push(card.id);
            }
            match columns.iter_mut().find(|c| c.id == card.column_id) {
                Some(column) => column.cards.push(CardView {
                    card_id: card.id,
                    task_id: card.task_id,
                    order_index: card.order_index,
                    task,
                }),
                None => tracing::debug!(
                    "Card {} references unknown column {} on board {}",
                    card.id,
                    card.column_id,
                    self.board.id
                ),
            }
        }

        for column in &mut columns {
            column.cards.sort_by_key(|c| c.order_index);
        }

        BoardView {
            board: self.board.clone(),
            columns,
            unmapped_tasks: self.unmapped_tasks(tasks).into_iter().cloned().collect(),
            dangling_card_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::item::tests::sample_task;
    use serde_json::json;

    fn detail() -> BoardDetail {
        serde_json::from_value(json!({
            "board": {"id": 1, "name": "Launch", "description": "Cross-team launch", "owner_id": 1},
            "columns": [{"id": 10, "name": "Todo"}, {"id": 11, "name": "Doing"}],
            "cards": [
                {"id": 100, "task_id": 2, "column_id": 10, "order_index": 2},
                {"id": 101, "task_id": 1, "column_id": 10, "order_index": 1},
                {"id": 102, "task_id": 42, "column_id": 11, "order_index": 1}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_assemble_orders_cards_and_tracks_gaps() {
        let tasks = vec![
            sample_task(1, Some(1)),
            sample_task(2, Some(1)),
            sample_task(3, Some(1)),
            sample_task(4, Some(2)),
        ];
        let view = detail().assemble(&tasks);

        assert_eq!(view.columns.len(), 2);
        let todo: Vec<i64> = view.columns[0].cards.iter().map(|c| c.task_id).collect();
        assert_eq!(todo, vec![1, 2]);
        assert_eq!(view.columns[0].cards[0].task.as_ref().unwrap().id, 1);

        assert_eq!(view.columns[1].cards[0].task, None);
        assert_eq!(view.dangling_card_ids, vec![102]);

        let unmapped: Vec<i64> = view.unmapped_tasks.iter().map(|t| t.id).collect();
        assert_eq!(unmapped, vec![3]);
    }

    #[test]
    fn test_board_without_cards_reports_all_board_tasks() {
        let mut empty = detail();
        empty.cards.clear();
        let tasks = vec![sample_task(1, Some(1)), sample_task(2, None)];
        let unmapped = empty.unmapped_tasks(&tasks);
        assert_eq!(unmapped.len(), 1);
        assert_eq!(unmapped[0].id, 1);
    }
}
