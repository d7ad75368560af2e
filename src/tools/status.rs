//! NutriPlan Status Tool
//!
//! Provides runtime status information about the NutriPlan service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Meal planning instructions for AI assistants
pub const PLANNER_INSTRUCTIONS: &str = r#"
# NutriPlan Meal Planning Instructions

This guide explains how to set up goals and plan a week of meals with the NutriPlan tools.

## Overview

A weekly plan needs:
1. **User** - The person the plan belongs to
2. **Profile** (optional) - Body metrics and daily goals for the user
3. **Recipes** - Saved locally before they can be planned
4. **Assignments** - A recipe placed on a day of the week and a meal slot

## Days and Slots

- `day_of_week` runs from 0 (Monday) to 6 (Sunday). `list_meal_plan` reports today's index.
- `meal_slot` is one of `breakfast`, `lunch`, `dinner`, `snack`. Plans are always shown in that order.

## Step-by-Step

### 1. Create the user

```
create_user(name: "Sam", email: "sam@example.com")
```

### 2. Set the profile

Enter weight and height in whatever units the user gives you. Goals are derived when omitted.

```
set_profile(
  user_id: 1,
  weight: 165, weight_unit: "lbs",
  height: 68, height_unit: "in",
  age: 34, sex: "female", activity_level: "light"
)
```

Sex must be `male` or `female` and activity level one of `sedentary`, `light`, `moderate`,
`active`, `very_active`. Pass `lenient: true` to the calculator tools only when you need the
legacy fallback (unknown sex treated as female, unknown activity as moderate).

### 3. Save recipes

Pass the fields from the recipe search result. Saving the same `external_id` twice refreshes
the stored recipe instead of duplicating it.

```
save_recipe(external_id: "716429", title: "Pasta with Garlic", servings: 2,
            ready_in_minutes: 45, calories_per_serving: 543)
```

### 4. Plan meals

```
add_recipe_to_meal_plan(user_id: 1, recipe_id: 3, day_of_week: 0, meal_slot: "dinner")
```

Adding the same recipe to the same day and slot again returns the existing entry.

### 5. Review

- `list_meal_plan(user_id: 1)` - the week grouped by day
- `get_meal_plan_summary(user_id: 1)` - planned calories per day against the calorie goal

## Quick Reference

| Task | Tool |
|------|------|
| Health goals from metrics | `calculate_health_goals` |
| Unit conversion | `convert_weight`, `convert_height` |
| Check entered values | `validate_body_metrics` |
| Remove one entry | `remove_meal_plan_entry` |
| Clear a day | `remove_meal_plan_day` |
| Clear the whole plan | `remove_all_meal_plan` |
| Delete a recipe | `delete_recipe` (refused while planned) |
"#;

/// Runtime status of the NutriPlan service
#[derive(Debug, Clone, Serialize)]
pub struct NutriplanStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> NutriplanStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutriplanStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
