// Shared fixtures for CLI integration tests
#![allow(dead_code)] // not every test target uses every helper

use std::fs;
use std::path::{Path, PathBuf};

/// Two-pointer trapping-rain-water solution used across the test suite.
pub const RAIN_WATER: &str = concat!(
    "class Solution:\n",
    "    def trap(self, height):\n",
    "        if not height:\n",
    "            return 0\n",
    "        left, right = 0, len(height) - 1\n",
    "        left_max, right_max = 0, 0\n",
    "        total = 0\n",
    "        while left < right:\n",
    "            if height[left] < height[right]:\n",
    "                if height[left] >= left_max:\n",
    "                    left_max = height[left]\n",
    "                else:\n",
    "                    total += left_max - height[left]\n",
    "                left += 1\n",
    "            else:\n",
    "                if height[right] >= right_max:\n",
    "                    right_max = height[right]\n",
    "                else:\n",
    "                    total += right_max - height[right]\n",
    "                right -= 1\n",
    "        return total\n",
);

/// A solution whose entry point always raises.
pub const RAISER: &str = concat!(
    "class Solution:\n",
    "    def trap(self, height):\n",
    "        raise ValueError('intentional failure')\n",
);

/// Helper-only code, no Solution class.
pub const HELPER_ONLY: &str = "def helper(x):\n    return x + 1\n";

/// Write a single-code-cell notebook into `dir` and return its path.
pub fn write_notebook(dir: &Path, name: &str, code: &str) -> PathBuf {
    let nb = serde_json::json!({
        "cells": [
            {"cell_type": "markdown", "source": ["# fixture\n"]},
            {"cell_type": "code", "source": [code]}
        ]
    });
    let path = dir.join(name);
    fs::write(&path, nb.to_string()).unwrap();
    path
}
