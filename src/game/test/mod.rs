//! Tests for the werewolf game engine, grouped by the part of the round they exercise.

#![cfg(test)]

pub mod night_actions;
